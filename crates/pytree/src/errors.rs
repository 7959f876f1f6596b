use thiserror::Error;

/// Failures raised when two trees, or a tree and a flat leaf list, disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree structure mismatch at {path}: expected {expected}, found {found}")]
    StructureMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("tree expects {expected} leaves, received {found}")]
    LeafCountMismatch { expected: usize, found: usize },
}
