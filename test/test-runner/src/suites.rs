use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_derive::Deserialize;
use walkdir::WalkDir;

use quarry_lang_driver::paths::FILE_EXTENSION;

// Case
//
//

/// A single `.qry` file of a testsuite, with its expected output next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub suite: String,
    pub name: String,
    pub path: PathBuf,
}

impl Case {
    pub fn new(suite: String, path: PathBuf) -> io::Result<Self> {
        let name = path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| io::Error::other(format!("invalid case name: {}", path.display())))?
            .to_owned();
        Ok(Self { suite, name, path })
    }

    pub fn content(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    pub fn expected(&self) -> io::Result<Option<String>> {
        let path = self.expected_path();
        if path.is_file() { fs::read_to_string(path).map(Some) } else { Ok(None) }
    }

    pub fn set_expected(&self, s: &str) -> io::Result<()> {
        fs::write(self.expected_path(), s)
    }

    /// Whether `filter` occurs in the suite, the name or the source of the case.
    pub fn matches(&self, filter: &str) -> bool {
        self.suite.contains(filter)
            || self.name.contains(filter)
            || self.content().map(|content| content.contains(filter)).unwrap_or(false)
    }

    fn expected_path(&self) -> PathBuf {
        self.path.with_extension("expected")
    }
}

/// The cases directly inside `path`. Subdirectories hold files which cases import.
fn case_paths(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
        let path = entry.map_err(io::Error::other)?.into_path();
        if path.is_file() && path.extension() == Some(OsStr::new(FILE_EXTENSION)) {
            paths.push(path);
        }
    }
    Ok(paths)
}

// Suites
//
//

pub fn load(path: &Path) -> io::Result<Vec<Suite>> {
    let mut suites = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
        let path = entry.map_err(io::Error::other)?.into_path();
        if path.is_dir() {
            suites.push(Suite::new(path)?);
        }
    }
    Ok(suites)
}

/// Each testsuite is configured by a `suite.toml` file whose contents
/// are described by this struct.
#[derive(Default, Deserialize, Clone, Debug)]
pub struct Config {
    /// In which phase the cases of the testsuite are supposed to fail.
    /// If this is none, then the testcases should succeed.
    pub fail: Option<String>,
    /// Human-readable description of what the tests in this suite are testing.
    #[serde(default)]
    pub description: String,
}

/// A single testsuite such as "fail-parse", "fail-lower" or "success".
#[derive(Clone, Debug)]
pub struct Suite {
    pub name: String,
    pub config: Config,
    pub cases: Vec<Case>,
}

impl Suite {
    pub fn new(path: PathBuf) -> io::Result<Self> {
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| io::Error::other(format!("invalid suite name: {}", path.display())))?
            .to_owned();
        let config_path = path.join("suite.toml");
        let config = if config_path.is_file() {
            let text = fs::read_to_string(config_path)?;
            toml::from_str(&text).map_err(io::Error::other)?
        } else {
            Config::default()
        };
        let cases = case_paths(&path)?
            .into_iter()
            .map(|case| Case::new(name.clone(), case))
            .collect::<io::Result<_>>()?;
        Ok(Suite { name, config, cases })
    }
}
