//! Output artifacts: names, JSON encoding and persistence.

mod json;
pub mod naming;
mod writer;

pub use json::{to_json, JsonFormat};
pub use writer::{ArtifactWriter, FsArtifactWriter, MemoryArtifactWriter, OutputContext};
