use std::path::{Path, PathBuf};

use crate::error::ParseError;

/// Where plan document text comes from.
pub trait PlanSource {
    /// Fetch the whole document as text.
    fn fetch(&self) -> Result<String, ParseError>;

    /// Human-readable origin, used for the project name and logs.
    fn describe(&self) -> String;
}

/// A plan document on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlanSource {
    path: PathBuf,
}

impl FilePlanSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanSource for FilePlanSource {
    fn fetch(&self) -> Result<String, ParseError> {
        std::fs::read_to_string(&self.path).map_err(|source| ParseError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// The file stem, e.g. `planning` for `planning.gan`.
    fn describe(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported Plan")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_and_names_it_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roadmap.gan");
        std::fs::write(&path, "<project/>").unwrap();

        let source = FilePlanSource::new(&path);
        assert_eq!(source.fetch().unwrap(), "<project/>");
        assert_eq!(source.describe(), "roadmap");
    }

    #[test]
    fn missing_file_reports_path() {
        let source = FilePlanSource::new("/nonexistent/plan.gan");
        match source.fetch() {
            Err(ParseError::Read { path, .. }) => assert_eq!(path, PathBuf::from("/nonexistent/plan.gan")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
