//! Errors raised by the data-model layer when a cheap contract check fails.

use thiserror::Error;

/// Error conditions surfaced while building or configuring the columnar model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A per-row field was re-declared with a different width or numeric type.
    #[error(
        "field '{name}' already exists as {existing}, cannot redeclare it as {requested}"
    )]
    FieldConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// A per-row field was requested that was never declared.
    #[error("unknown per-row field '{name}'")]
    UnknownField { name: String },

    /// Lattice parameters do not describe a cell with positive volume.
    #[error("degenerate unit cell: {reason}")]
    DegenerateCell { reason: String },

    /// A transform that must be invertible is singular.
    #[error("singular {context} matrix cannot be inverted")]
    SingularMatrix { context: String },
}

impl Error {
    /// Helper for constructing an [`Error::FieldConflict`] variant.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name being redeclared.
    /// * `existing` - Human-readable description of the current declaration.
    /// * `requested` - Human-readable description of the conflicting declaration.
    pub fn field_conflict(
        name: impl Into<String>,
        existing: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::FieldConflict {
            name: name.into(),
            existing: existing.into(),
            requested: requested.into(),
        }
    }

    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    pub fn degenerate_cell(reason: impl Into<String>) -> Self {
        Self::DegenerateCell {
            reason: reason.into(),
        }
    }

    pub fn singular_matrix(context: impl Into<String>) -> Self {
        Self::SingularMatrix {
            context: context.into(),
        }
    }
}
