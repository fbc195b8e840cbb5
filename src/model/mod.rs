//! Core data structures of the molecular engine.
//!
//! This module defines the columnar stores, the interning tables for atom and residue
//! types, the incremental builder that fills them, the spatial indices used for bond
//! inference, and the proxies and views through which everything is read back.

pub mod assembly;
pub mod atom_map;
pub mod bond;
pub mod bounds;
pub mod builder;
pub mod error;
pub mod grid;
pub mod kdtree;
pub mod polymer;
pub mod proxy;
pub mod residue_map;
pub mod residue_type;
pub mod store;
pub mod structure;
pub mod types;
pub mod unitcell;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures;
