pub use file_system::FileSystemSource;

use quarry_lang_kernel::HashMap;
use url::Url;

use crate::result::DriverError;

pub trait FileSource {
    /// Check if a file with the given URI exists
    fn exists(&self, uri: &Url) -> bool;
    /// Read the contents of a file with the given URI
    fn read_to_string(&mut self, uri: &Url) -> Result<String, DriverError>;
    /// The URI under which the file `uri` is remembered as imported.
    ///
    /// Two URIs that refer to the same file must have the same canonical URI.
    fn canonicalize(&self, uri: &Url) -> Result<Url, DriverError> {
        Ok(uri.clone())
    }
}

mod file_system {
    use std::path::{Path, PathBuf};

    use super::*;

    /// A file source that reads `file://` URIs from the file system
    pub struct FileSystemSource {
        root: PathBuf,
    }

    impl FileSystemSource {
        /// Relative paths are resolved against `root`.
        pub fn new<P: AsRef<Path>>(root: P) -> Self {
            Self { root: root.as_ref().to_path_buf() }
        }

        fn path(&self, uri: &Url) -> Result<PathBuf, DriverError> {
            let filepath =
                uri.to_file_path().map_err(|()| DriverError::InvalidUri(uri.clone()))?;
            Ok(self.root.join(filepath))
        }
    }

    impl FileSource for FileSystemSource {
        fn exists(&self, uri: &Url) -> bool {
            self.path(uri).map(|path| path.is_file()).unwrap_or(false)
        }

        fn read_to_string(&mut self, uri: &Url) -> Result<String, DriverError> {
            let path = self.path(uri)?;
            if !path.is_file() {
                return Err(DriverError::FileNotFound(uri.clone()));
            }
            let source = std::fs::read_to_string(&path)?;
            // Checkouts on Windows may carry \r\n line endings, spans are computed on \n
            Ok(source.replace("\r\n", "\n"))
        }

        fn canonicalize(&self, uri: &Url) -> Result<Url, DriverError> {
            let path = self.path(uri)?;
            if !path.is_file() {
                return Err(DriverError::FileNotFound(uri.clone()));
            }
            let path = path.canonicalize()?;
            Url::from_file_path(&path).map_err(|()| DriverError::InvalidUri(uri.clone()))
        }
    }
}

/// A file source that keeps files in memory
#[derive(Default)]
pub struct InMemorySource {
    files: HashMap<Url, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: Url, source: impl Into<String>) {
        self.files.insert(uri, source.into());
    }

    pub fn with(mut self, uri: Url, source: impl Into<String>) -> Self {
        self.insert(uri, source);
        self
    }
}

impl FileSource for InMemorySource {
    fn exists(&self, uri: &Url) -> bool {
        self.files.contains_key(uri)
    }

    fn read_to_string(&mut self, uri: &Url) -> Result<String, DriverError> {
        self.files.get(uri).cloned().ok_or_else(|| DriverError::FileNotFound(uri.clone()))
    }

    fn canonicalize(&self, uri: &Url) -> Result<Url, DriverError> {
        if self.exists(uri) { Ok(uri.clone()) } else { Err(DriverError::FileNotFound(uri.clone())) }
    }
}

#[cfg(test)]
mod fs_tests {
    use super::*;

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn in_memory_files() {
        let mut source = InMemorySource::new().with(uri("inmemory:///a.qry"), "let A : Type");
        assert!(source.exists(&uri("inmemory:///a.qry")));
        assert_eq!(source.read_to_string(&uri("inmemory:///a.qry")).unwrap(), "let A : Type");
        assert!(matches!(
            source.read_to_string(&uri("inmemory:///b.qry")),
            Err(DriverError::FileNotFound(_))
        ));
    }

    #[test]
    fn file_system_paths_are_canonical() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.qry"), "let A : Type\r\n").unwrap();
        let mut source = FileSystemSource::new(dir.path());

        let direct = Url::from_file_path(dir.path().join("a.qry")).unwrap();
        let detour = Url::from_file_path(dir.path().join("sub").join("..").join("a.qry")).unwrap();
        assert_eq!(source.canonicalize(&direct).unwrap(), source.canonicalize(&detour).unwrap());
        assert_eq!(source.read_to_string(&direct).unwrap(), "let A : Type\n");
    }
}
