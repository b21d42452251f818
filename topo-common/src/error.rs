use crate::task::TaskId;

/// Failures at the JSON-loading / construction boundary. Distinct from the
/// `Vec<String>` diagnostics the verification pipeline itself accumulates —
/// nothing inside the pipeline ever returns one of these.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON from {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown task identifier {0}")]
    UnknownTask(TaskId),
}
