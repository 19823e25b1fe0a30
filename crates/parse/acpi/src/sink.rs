//! Destinations for dumped tables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A named-artifact store.
pub trait TableSink {
    /// Create or overwrite the artifact `name` with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the artifact cannot be written.
    fn persist(&mut self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

impl<T: TableSink + ?Sized> TableSink for &mut T {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        (**self).persist(name, bytes)
    }
}

/// Writes each artifact as a file inside a directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Create a sink writing into `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSink for DirSink {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        // Truncates, so a shorter table never leaves a stale tail behind.
        fs::write(self.dir.join(name), bytes)
    }
}

/// Keeps artifacts in memory, in the order they were persisted.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    writes: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write, oldest first, including ones later overwritten.
    #[must_use]
    pub fn writes(&self) -> &[(String, Vec<u8>)] {
        &self.writes
    }

    /// Artifact names in persist order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(name, _)| name.as_str())
    }

    /// The current contents of `name`: the most recent write wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl TableSink for MemorySink {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.writes.push((name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}
