pub mod constraint;
pub mod error;
pub mod kg;
pub mod model;
pub mod rule;
pub mod task;

pub use constraint::GenericConstraint;
pub use error::LoadError;
pub use kg::{KgComponentEntry, KgStore, KnowledgeGraph};
pub use model::{Component, Endpoint, Net, Pin, Snapshot};
pub use rule::{EndpointDescriptor, Rule};
pub use task::TaskId;

use std::fs;
use std::path::Path;

/// Load and parse a JSON file, wrapping I/O and parse failures in
/// `LoadError` with the offending path attached.
pub fn load_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}
