//! Error taxonomy for the core. Per the error-handling design, most of
//! these are local recoveries rather than failures a caller must act on;
//! only `MalformedMessage` and `MissingChildSummary` are ever actually
//! returned from a public operation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Never returned: `ClusteringList::add` always clusterizes back down
    /// to the configured bound before returning. Kept as a variant so
    /// callers/tests can name the condition.
    #[error("cluster count exceeded bound")]
    ClusterOverflow,

    /// A computed value fell outside its mathematical domain (e.g. a
    /// negative `sqdiff`) by more than the configured epsilon.
    #[error("numeric domain violation: {violation}")]
    NumericDomain { violation: f64 },

    /// Never returned: `TaskList::remove_task` is an idempotent no-op.
    /// Kept as a variant for tests that want to assert the no-op
    /// explicitly.
    #[error("unknown task id: {0}")]
    UnknownTaskId(u32),

    #[error("missing child summary for branch {0}")]
    MissingChildSummary(String),
}
