//! Cross-cutting helpers: a fixed-length bit set for atom selections and the
//! feature-gated parallel iteration shim.

pub mod bitarray;
pub mod parallel;
