#![allow(dead_code)]

use assert_cmd::Command;
use mediasort::mediasort_core::{Result, RunContext, SortError, TagReader};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub fn mediasort_cmd() -> Command {
    Command::cargo_bin("mediasort").unwrap()
}

/// The single run directory created under a logs root.
pub fn only_run_dir(logs_root: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = fs::read_dir(logs_root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one run directory, found {entries:?}");
    entries.into_iter().next().unwrap()
}

pub fn run_context(logs_root: &Path) -> RunContext {
    RunContext::start(logs_root)
}

/// In-memory stand-in for exiftool, keyed by file name.
#[derive(Default)]
pub struct FakeExif {
    by_name: HashMap<String, Map<String, Value>>,
    pub fail: bool,
    /// File name that fails any batch containing it, the way exiftool reports
    /// a file that vanished after the walk.
    pub missing: Option<String>,
    pub calls: usize,
}

impl FakeExif {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn missing_file(mut self, file_name: &str) -> Self {
        self.missing = Some(file_name.to_string());
        self
    }

    pub fn with(mut self, file_name: &str, mime: &str, create_date: Option<&str>) -> Self {
        let mut tags = Map::new();
        tags.insert("File:MIMEType".to_string(), json!(mime));
        if let Some(date) = create_date {
            tags.insert("EXIF:CreateDate".to_string(), json!(date));
        }
        self.by_name.insert(file_name.to_string(), tags);
        self
    }
}

impl TagReader for FakeExif {
    fn read_tags(&mut self, paths: &[PathBuf]) -> Result<Vec<Value>> {
        self.calls += 1;
        if self.fail {
            return Err(SortError::ExiftoolUnavailable("exiftool exited unexpectedly".to_string()));
        }
        if let Some(missing) = &self.missing {
            let hit = paths
                .iter()
                .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(missing.as_str()));
            if let Some(path) = hit {
                return Err(SortError::MetadataFileNotFound(path.clone()));
            }
        }

        Ok(paths
            .iter()
            .filter_map(|path| {
                let source = path.to_str()?;
                let name = path.file_name()?.to_str()?;
                let mut object = self.by_name.get(name)?.clone();
                object.insert("SourceFile".to_string(), json!(source));
                Some(Value::Object(object))
            })
            .collect())
    }
}
