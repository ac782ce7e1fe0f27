//! The mapped-object contract: a derived accessor table plus an optional
//! hook set.
//!
//! [`Properties`] is the mechanical part — property lookup by name and the
//! `Any` plumbing — and is meant to be generated with
//! `#[derive(Properties)]`. [`MappedObject`] layers the customization
//! surface on top as defaulted methods: a type opts in with an empty
//! `impl MappedObject for T {}` and overrides only the hooks it needs.
//! Every default is the engine's standard behavior at that decision
//! point, so not implementing a hook and implementing it as its default
//! are indistinguishable.

use std::any::Any;

use chrono::NaiveDateTime;

use crate::error::HookResult;
use crate::value::{Property, Value};

/// The per-type property accessor table.
///
/// Prefer `#[derive(Properties)]` over implementing this by hand; the
/// derive keys the table by field name (or `#[mapped(rename = "...")]`)
/// over every field of type [`Property`].
pub trait Properties: Any {
    /// The concrete type's name, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Looks up a property slot by name.
    fn property(&self, name: &str) -> Option<&Property>;

    fn property_mut(&mut self, name: &str) -> Option<&mut Property>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Constructor for a mapped type, as stored in the class registry and
/// returned by the nested-class hook.
pub type ObjectFactory = fn() -> Box<dyn MappedObject>;

/// Builds an [`ObjectFactory`] for a default-constructible mapped type.
pub fn factory<T: MappedObject + Default>() -> ObjectFactory {
    construct::<T>
}

fn construct<T: MappedObject + Default>() -> Box<dyn MappedObject> {
    Box::new(T::default())
}

/// A type the mapper can instantiate and populate from XML elements.
///
/// All methods are optional customization hooks with engine-default
/// behavior. Fallible hooks abort the whole parse when they return an
/// error; vetoing hooks (`should_*`) skip silently.
pub trait MappedObject: Properties {
    /// Overrides the property name an element tag feeds on this object.
    /// Default: the tag transformed to a snake_case identifier.
    fn property_for_tag(&self, _tag: &str) -> Option<String> {
        None
    }

    /// Overrides the class to instantiate for a nested property.
    /// Default: fall back to the class registry's tag mapping.
    fn class_for_property(&self, _property: &str) -> Option<ObjectFactory> {
        None
    }

    /// Declares a chrono format string for a date-typed property. The
    /// engine parses the element text with it; text that does not parse
    /// is a fatal mapping error.
    fn date_format_for(&self, _property: &str) -> Option<&'static str> {
        None
    }

    /// Fully custom date parsing for a property; consulted before
    /// [`MappedObject::date_format_for`]. Returning `None` falls through
    /// to the format-based path.
    fn date_for_property(&self, _property: &str, _text: &str) -> Option<NaiveDateTime> {
        None
    }

    /// Called after construction, before any element is mapped onto this
    /// object.
    fn will_be_mapped(&mut self) -> HookResult<()> {
        Ok(())
    }

    /// Called when this object's element closes, before the object is
    /// assigned to its parent.
    fn did_map(&mut self) -> HookResult<()> {
        Ok(())
    }

    /// Vetoes a scalar assignment. `Ok(false)` skips it silently.
    fn should_map_element(
        &self,
        _element: &str,
        _property: &str,
        _value: &Value,
    ) -> HookResult<bool> {
        Ok(true)
    }

    /// Notification immediately before a scalar assignment.
    fn will_map_element(
        &mut self,
        _element: &str,
        _property: &str,
        _value: &Value,
    ) -> HookResult<()> {
        Ok(())
    }

    /// Performs a scalar assignment. Return the value to have the engine
    /// store it in the property slot, or `None` when this object already
    /// handled the value itself.
    fn map_element(
        &mut self,
        _element: &str,
        _property: &str,
        value: Value,
    ) -> HookResult<Option<Value>> {
        Ok(Some(value))
    }

    /// Notification after a scalar assignment completed.
    fn did_map_element(&mut self, _element: &str, _property: &str) -> HookResult<()> {
        Ok(())
    }

    /// Vetoes appending to a repeated-element sequence. `Ok(false)`
    /// leaves the property exactly as it was.
    fn should_add_element(
        &self,
        _element: &str,
        _property: &str,
        _value: &Value,
        _existing: &[Value],
    ) -> HookResult<bool> {
        Ok(true)
    }

    /// Notification immediately before a sequence addition.
    fn will_add_element(
        &mut self,
        _element: &str,
        _property: &str,
        _value: &Value,
        _existing: &[Value],
    ) -> HookResult<()> {
        Ok(())
    }

    /// Performs a sequence addition. Return the value to have the engine
    /// append it, or `None` when this object already handled it.
    fn add_element(
        &mut self,
        _element: &str,
        _property: &str,
        value: Value,
        _existing: &[Value],
    ) -> HookResult<Option<Value>> {
        Ok(Some(value))
    }

    /// Notification after a sequence addition completed.
    fn did_add_element(&mut self, _element: &str, _property: &str) -> HookResult<()> {
        Ok(())
    }
}

impl dyn MappedObject {
    /// Borrows this object as a concrete mapped type.
    pub fn downcast_ref<T: MappedObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: MappedObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Consumes this object into a concrete mapped type.
    pub fn downcast<T: MappedObject>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}
