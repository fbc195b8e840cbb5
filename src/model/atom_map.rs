//! Interning table for `(atom name, element)` pairs.

use super::types::Element;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Attributes shared by every atom with the same name and element.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub name: SmolStr,
    pub element: Element,
    /// Covalent radius in Ångström, copied from the element table.
    pub covalent: f32,
    pub is_metal: bool,
}

impl AtomType {
    fn new(name: &str, element: Element) -> Self {
        Self {
            name: SmolStr::new(name),
            element,
            covalent: element.covalent_radius(),
            is_metal: element.is_metal(),
        }
    }
}

/// Append-only map from `(name, element)` to a dense `u32` id.
///
/// Ids are assigned in first-seen order starting at zero and never change.
#[derive(Debug, Clone, Default)]
pub struct AtomMap {
    types: Vec<AtomType>,
    lookup: HashMap<(SmolStr, Element), u32>,
}

impl AtomMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `(name, element)`, interning it on first use.
    pub fn add(&mut self, name: &str, element: Element) -> u32 {
        let key = (SmolStr::new(name), element);
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = self.types.len() as u32;
        self.types.push(AtomType::new(name, element));
        self.lookup.insert(key, id);
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this map.
    pub fn get(&self, id: u32) -> &AtomType {
        &self.types[id as usize]
    }

    pub fn find(&self, name: &str, element: Element) -> Option<u32> {
        self.lookup.get(&(SmolStr::new(name), element)).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AtomType)> {
        self.types.iter().enumerate().map(|(i, t)| (i as u32, t))
    }
}
