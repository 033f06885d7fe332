use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Metadata tags for one file, keyed by group-qualified exiftool name (`EXIF:CreateDate`).
pub type TagMap = HashMap<String, String>;

/// A discovered file together with whatever metadata could be read for it.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub tags: TagMap,
}

impl FileRecord {
    pub fn new(path: PathBuf, tags: TagMap) -> Self {
        Self { path, tags }
    }

    /// Look up a tag by its group-qualified name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// MIME type reported by exiftool, with or without the `File:` group prefix.
    pub fn mime_type(&self) -> Option<&str> {
        self.tag("File:MIMEType").or_else(|| self.tag("MIMEType"))
    }

    /// Lowercased file extension, if the path has one.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Video,
    PrimaryImage,
    Sidecar,
    Unrecognized,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Video => "video",
            Category::PrimaryImage => "image",
            Category::Sidecar => "sidecar",
            Category::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The routing decision for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub category: Category,
    /// `None` only for unrecognized files.
    pub destination: Option<PathBuf>,
}

impl ClassifiedFile {
    pub fn routed(path: PathBuf, category: Category, destination: PathBuf) -> Self {
        Self {
            path,
            category,
            destination: Some(destination),
        }
    }

    pub fn unrecognized(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            category: Category::Unrecognized,
            destination: None,
        }
    }
}
