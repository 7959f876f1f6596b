//! Nested containers of leaves.
//!
//! [`Tree`] models the "mapping / ordered sequence / leaf" structures that
//! optimizer utilities receive as parameters or gradients. Traversals visit
//! leaves depth-first, with mapping keys in sorted order, and rebuild the
//! exact nesting on the way out.

mod errors;
mod tree;

pub use errors::TreeError;
pub use tree::{NodeKind, Tree};
