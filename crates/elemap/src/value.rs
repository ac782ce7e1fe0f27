//! The value model: what a closed element contributes to its parent.
//!
//! XML carries no cardinality information, so a property that receives one
//! value holds a scalar and is transparently promoted to an ordered
//! [`Value::List`] when a repeated sibling element feeds it again. The
//! previous scalar becomes element 0 of the sequence; callers that only
//! ever read through [`Property::values`] never notice the difference.

use std::fmt;
use std::slice;

use chrono::NaiveDateTime;

use crate::object::MappedObject;

/// A coerced value produced by closing an element.
pub enum Value {
    /// Accumulated character data, verbatim.
    Text(String),
    /// Character data parsed through one of the date hooks.
    Date(NaiveDateTime),
    /// A completed mapped object.
    Object(Box<dyn MappedObject>),
    /// Repeated sibling elements accumulated in document order.
    List(Vec<Value>),
}

impl Value {
    /// The textual value, if this is a text scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The date value, if this is a date scalar.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// The mapped object, if this is an object value.
    pub fn as_object(&self) -> Option<&dyn MappedObject> {
        match self {
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Downcasts an object value to a concrete mapped type.
    pub fn object<T: MappedObject>(&self) -> Option<&T> {
        self.as_object().and_then(|object| object.as_any().downcast_ref())
    }

    /// Consumes an object value into its concrete mapped type.
    pub fn into_object<T: MappedObject>(self) -> Option<Box<T>> {
        match self {
            Value::Object(object) => object.into_any().downcast().ok(),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Date(date) => f.debug_tuple("Date").field(date).finish(),
            Value::Object(object) => f.debug_tuple("Object").field(&object.type_name()).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// One slot of a mapped object's accessor table.
///
/// Starts unset and is filled by the mapper during a parse; typed read
/// accessors cover the common shapes without matching on [`Value`]
/// directly. `#[derive(Properties)]` exposes every field of this type to
/// the mapper by name.
#[derive(Debug, Default)]
pub struct Property(Option<Value>);

impl Property {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the parse assigned anything here.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    pub fn set(&mut self, value: Value) {
        self.0 = Some(value);
    }

    pub fn take(&mut self) -> Option<Value> {
        self.0.take()
    }

    /// The assigned values as a slice: empty when unset, one element for a
    /// scalar, all elements for a promoted sequence.
    pub fn values(&self) -> &[Value] {
        match &self.0 {
            None => &[],
            Some(Value::List(items)) => items,
            Some(single) => slice::from_ref(single),
        }
    }

    /// The scalar textual value, if set to one.
    pub fn text(&self) -> Option<&str> {
        self.get()?.as_text()
    }

    /// The scalar date value, if set to one.
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.get()?.as_date()
    }

    /// The scalar object value downcast to a concrete type.
    pub fn object<T: MappedObject>(&self) -> Option<&T> {
        self.get()?.object()
    }

    /// All object values of a concrete type, in document order.
    pub fn objects<T: MappedObject>(&self) -> impl Iterator<Item = &T> {
        self.values().iter().filter_map(|value| value.object::<T>())
    }

    /// All textual values, in document order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.values().iter().filter_map(Value::as_text)
    }
}
