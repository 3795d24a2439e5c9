//! Artifact persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Persists named byte blobs.
///
/// Writing a name that already exists replaces it.
pub trait ArtifactWriter {
    /// Store `bytes` under `name`.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

impl<W: ArtifactWriter + ?Sized> ArtifactWriter for &mut W {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(name, bytes)
    }
}

/// An output directory, created once when acquired.
#[derive(Debug, Clone)]
pub struct OutputContext {
    dir: PathBuf,
}

impl OutputContext {
    /// Create the directory (and its parents) if missing.
    pub fn acquire<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::ArtifactWrite {
            path: dir.clone(),
            source,
        })?;
        log::debug!("Output directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of an artifact name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Writes artifacts as files in an output directory.
#[derive(Debug)]
pub struct FsArtifactWriter {
    context: OutputContext,
}

impl FsArtifactWriter {
    /// Writer over an acquired output context.
    pub fn new(context: OutputContext) -> Self {
        Self { context }
    }

    /// Acquire `dir` and write into it.
    pub fn create<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        Ok(Self::new(OutputContext::acquire(dir)?))
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        self.context.dir()
    }
}

impl ArtifactWriter for FsArtifactWriter {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.context.path_for(name);
        fs::write(&path, bytes).map_err(|source| Error::ArtifactWrite {
            path: path.clone(),
            source,
        })?;
        log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct MemoryArtifactWriter {
    artifacts: BTreeMap<String, Vec<u8>>,
}

impl MemoryArtifactWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `name`.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.artifacts.get(name).map(Vec::as_slice)
    }

    /// Stored names, ascending.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Consume the writer and return all artifacts.
    pub fn into_inner(self) -> BTreeMap<String, Vec<u8>> {
        self.artifacts
    }
}

impl ArtifactWriter for MemoryArtifactWriter {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.artifacts.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
