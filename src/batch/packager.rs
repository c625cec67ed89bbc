use crate::foundation::error::OvermarkResult;

/// Consumer of encoded batch outputs, typically an archive writer.
///
/// Ordering contract: `add_file` is called in input order, only for files that succeeded, between
/// one `begin` and one `finish`.
pub trait BatchPackager: Send {
    /// Called once before any file, with the number of files that will be offered at most.
    fn begin(&mut self, expected: usize) -> OvermarkResult<()>;
    /// Add one encoded file.
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> OvermarkResult<()>;
    /// Called once after the last file.
    fn finish(&mut self) -> OvermarkResult<()>;
}

/// In-memory packager for tests and hosts that archive files themselves.
#[derive(Debug, Default)]
pub struct InMemoryPackager {
    expected: Option<usize>,
    finished: bool,
    pub(crate) files: Vec<(String, Vec<u8>)>,
}

impl InMemoryPackager {
    /// Create an empty packager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound announced in `begin`, if it was called.
    pub fn expected(&self) -> Option<usize> {
        self.expected
    }

    /// `true` once `finish` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Borrow the collected `(name, bytes)` pairs.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    /// Take the collected files.
    pub fn into_files(self) -> Vec<(String, Vec<u8>)> {
        self.files
    }
}

impl BatchPackager for InMemoryPackager {
    fn begin(&mut self, expected: usize) -> OvermarkResult<()> {
        self.expected = Some(expected);
        self.finished = false;
        self.files.clear();
        Ok(())
    }

    fn add_file(&mut self, name: &str, bytes: &[u8]) -> OvermarkResult<()> {
        self.files.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> OvermarkResult<()> {
        self.finished = true;
        Ok(())
    }
}
