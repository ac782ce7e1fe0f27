//! Static tag-to-class configuration.

use std::collections::HashMap;

use crate::object::{MappedObject, ObjectFactory, factory};

/// Maps element tag names to the classes the mapper instantiates for
/// them.
///
/// Populated once and handed to the mapper at construction; never
/// mutated during a parse. A tag with no entry here (and no
/// `class_for_property` hook override on the enclosing object) maps as
/// plain text.
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ObjectFactory>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class for a tag, builder style.
    pub fn with<T: MappedObject + Default>(mut self, tag: impl Into<String>) -> Self {
        self.register::<T>(tag);
        self
    }

    /// Registers a class for a tag.
    pub fn register<T: MappedObject + Default>(&mut self, tag: impl Into<String>) {
        self.classes.insert(tag.into(), factory::<T>());
    }

    /// The factory registered for a tag, if any.
    pub fn class_for(&self, tag: &str) -> Option<ObjectFactory> {
        self.classes.get(tag).copied()
    }
}
