use crate::mediasort_core::error::{Result, SortError};
use crate::mediasort_core::record::TagMap;
use exiftool::{ExifTool, ExifToolError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Extra exiftool arguments: `-G` prefixes every tag with its group (`EXIF:CreateDate`).
const EXIFTOOL_ARGS: &[&str] = &["-G"];

/// Source of raw per-file metadata, one JSON object per readable file.
pub trait TagReader {
    fn read_tags(&mut self, paths: &[PathBuf]) -> Result<Vec<Value>>;
}

/// Reads metadata through a single long-running exiftool process.
pub struct ExifToolReader {
    exiftool: Option<ExifTool>,
}

impl ExifToolReader {
    /// Spawn exiftool. Failing to start is not fatal here; every later read
    /// then reports an error and the run proceeds without metadata.
    pub fn new() -> Self {
        let exiftool = match ExifTool::new() {
            Ok(et) => Some(et),
            Err(e) => {
                log::warn!("Failed to start exiftool: {}", e);
                None
            }
        };
        Self { exiftool }
    }
}

impl Default for ExifToolReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagReader for ExifToolReader {
    fn read_tags(&mut self, paths: &[PathBuf]) -> Result<Vec<Value>> {
        let exiftool = self
            .exiftool
            .as_mut()
            .ok_or_else(|| SortError::ExiftoolUnavailable("exiftool failed to start".to_string()))?;

        exiftool
            .json_batch(paths, EXIFTOOL_ARGS)
            .map_err(|e| match e {
                ExifToolError::FileNotFound { path, .. } => SortError::MetadataFileNotFound(path),
                err @ (ExifToolError::ExifToolNotFound(_)
                | ExifToolError::ProcessTerminated
                | ExifToolError::StderrDisconnected
                | ExifToolError::Io(_)) => SortError::ExiftoolUnavailable(err.to_string()),
                other => SortError::Exiftool(other.to_string()),
            })
    }
}

/// Read tags for all paths, in one batched call when nothing goes wrong.
///
/// Non-UTF-8 paths are never sent to exiftool. If the batch fails, the
/// offending file is dropped and the rest are still read. Paths the reader did
/// not return are simply absent; only an unavailable tool yields an empty map.
pub fn read_metadata<R: TagReader + ?Sized>(
    reader: &mut R,
    paths: &[PathBuf],
) -> HashMap<PathBuf, TagMap> {
    if paths.is_empty() {
        return HashMap::new();
    }

    let readable: Vec<PathBuf> = paths
        .iter()
        .filter(|path| {
            let ok = path.to_str().is_some();
            if !ok {
                log::warn!("Skipping metadata for non-UTF-8 path: {}", path.display());
            }
            ok
        })
        .cloned()
        .collect();

    let mut objects = Vec::new();
    if let Err(e) = read_batch(reader, readable, &mut objects) {
        log::warn!(
            "Metadata extraction failed for {} files, continuing without metadata: {}",
            paths.len(),
            e
        );
        return HashMap::new();
    }

    let mut result = HashMap::with_capacity(objects.len());
    for object in objects {
        let Value::Object(fields) = object else {
            log::debug!("Ignoring non-object metadata entry");
            continue;
        };

        let Some(source) = fields.get("SourceFile").and_then(Value::as_str) else {
            log::debug!("Ignoring metadata entry without SourceFile");
            continue;
        };
        let source = PathBuf::from(source);

        let tags: TagMap = fields
            .iter()
            .filter(|(name, _)| name.as_str() != "SourceFile")
            .filter_map(|(name, value)| value_to_string(value).map(|v| (name.clone(), v)))
            .collect();

        result.insert(source, tags);
    }

    log::info!("Read metadata for {} of {} files", result.len(), paths.len());
    result
}

/// Read one batch into `objects`.
///
/// A file exiftool reports as missing is removed and the batch retried. Any
/// other failure splits the batch in half until the failing file is isolated
/// and dropped. Only `ExiftoolUnavailable` is returned to the caller.
fn read_batch<R: TagReader + ?Sized>(
    reader: &mut R,
    mut paths: Vec<PathBuf>,
    objects: &mut Vec<Value>,
) -> Result<()> {
    while !paths.is_empty() {
        match reader.read_tags(&paths) {
            Ok(batch) => {
                objects.extend(batch);
                return Ok(());
            }
            Err(e @ SortError::ExiftoolUnavailable(_)) => return Err(e),
            Err(SortError::MetadataFileNotFound(missing))
                if paths.len() > 1 && paths.contains(&missing) =>
            {
                log::warn!("Exiftool could not find {}, skipping it", missing.display());
                paths.retain(|path| path != &missing);
            }
            Err(e) if paths.len() == 1 => {
                log::warn!("Failed to read metadata for {}: {}", paths[0].display(), e);
                return Ok(());
            }
            Err(e) => {
                log::debug!("Metadata batch of {} files failed, splitting: {}", paths.len(), e);
                let rest = paths.split_off(paths.len() / 2);
                read_batch(reader, paths, objects)?;
                return read_batch(reader, rest, objects);
            }
        }
    }
    Ok(())
}

/// Render a JSON tag value as the string exiftool would print.
fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedReader(Result<Vec<Value>>);

    impl TagReader for FixedReader {
        fn read_tags(&mut self, _paths: &[PathBuf]) -> Result<Vec<Value>> {
            match &mut self.0 {
                Ok(v) => Ok(std::mem::take(v)),
                Err(_) => Err(SortError::Exiftool("boom".to_string())),
            }
        }
    }

    #[test]
    fn test_failed_call_yields_empty_map() {
        let mut reader = FixedReader(Err(SortError::Exiftool("boom".to_string())));
        let result = read_metadata(&mut reader, &[PathBuf::from("/a/b.jpg")]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_partial_results_keyed_by_source_file() {
        let mut reader = FixedReader(Ok(vec![
            json!({
                "SourceFile": "/a/IMG_1.jpg",
                "File:MIMEType": "image/jpeg",
                "EXIF:ISO": 100,
                "EXIF:Artist": null
            }),
            json!({ "File:MIMEType": "image/png" }),
            json!("not an object"),
        ]));
        let paths = vec![PathBuf::from("/a/IMG_1.jpg"), PathBuf::from("/a/IMG_2.png")];
        let result = read_metadata(&mut reader, &paths);

        assert_eq!(result.len(), 1);
        let tags = &result[&PathBuf::from("/a/IMG_1.jpg")];
        assert_eq!(tags["File:MIMEType"], "image/jpeg");
        assert_eq!(tags["EXIF:ISO"], "100");
        assert!(!tags.contains_key("EXIF:Artist"));
        assert!(!tags.contains_key("SourceFile"));
    }

    #[test]
    fn test_empty_path_list_skips_call() {
        struct PanicReader;
        impl TagReader for PanicReader {
            fn read_tags(&mut self, _paths: &[PathBuf]) -> Result<Vec<Value>> {
                panic!("reader must not be called");
            }
        }
        assert!(read_metadata(&mut PanicReader, &[]).is_empty());
    }

    /// Reads every path except `bad`, whose presence fails the whole batch.
    struct BadFileReader {
        bad: PathBuf,
        missing: bool,
        calls: usize,
    }

    impl TagReader for BadFileReader {
        fn read_tags(&mut self, paths: &[PathBuf]) -> Result<Vec<Value>> {
            self.calls += 1;
            if paths.contains(&self.bad) {
                return Err(if self.missing {
                    SortError::MetadataFileNotFound(self.bad.clone())
                } else {
                    SortError::Exiftool("Error: Unknown file type".to_string())
                });
            }
            Ok(paths
                .iter()
                .map(|p| json!({ "SourceFile": p.to_str().unwrap(), "File:MIMEType": "image/jpeg" }))
                .collect())
        }
    }

    fn sample_paths() -> Vec<PathBuf> {
        ["/a/1.jpg", "/a/2.jpg", "/a/3.jpg", "/a/4.jpg", "/a/5.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    #[test]
    fn test_missing_file_is_dropped_and_batch_retried() {
        let mut reader = BadFileReader {
            bad: PathBuf::from("/a/3.jpg"),
            missing: true,
            calls: 0,
        };
        let result = read_metadata(&mut reader, &sample_paths());

        assert_eq!(reader.calls, 2);
        assert_eq!(result.len(), 4);
        assert!(!result.contains_key(&PathBuf::from("/a/3.jpg")));
        assert_eq!(result[&PathBuf::from("/a/5.jpg")]["File:MIMEType"], "image/jpeg");
    }

    #[test]
    fn test_failing_file_is_isolated_by_splitting() {
        let mut reader = BadFileReader {
            bad: PathBuf::from("/a/2.jpg"),
            missing: false,
            calls: 0,
        };
        let result = read_metadata(&mut reader, &sample_paths());

        assert_eq!(result.len(), 4);
        assert!(!result.contains_key(&PathBuf::from("/a/2.jpg")));
        assert!(result.contains_key(&PathBuf::from("/a/1.jpg")));
        assert!(result.contains_key(&PathBuf::from("/a/4.jpg")));
    }

    #[test]
    fn test_unavailable_tool_stops_after_one_call() {
        struct Unavailable(usize);
        impl TagReader for Unavailable {
            fn read_tags(&mut self, _paths: &[PathBuf]) -> Result<Vec<Value>> {
                self.0 += 1;
                Err(SortError::ExiftoolUnavailable("not installed".to_string()))
            }
        }

        let mut reader = Unavailable(0);
        assert!(read_metadata(&mut reader, &sample_paths()).is_empty());
        assert_eq!(reader.0, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_not_sent() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = PathBuf::from(OsStr::from_bytes(b"/a/caf\xe9.jpg"));
        let mut reader = BadFileReader {
            bad: odd.clone(),
            missing: false,
            calls: 0,
        };
        let result = read_metadata(&mut reader, &[PathBuf::from("/a/1.jpg"), odd]);

        assert_eq!(reader.calls, 1);
        assert_eq!(result.len(), 1);
        assert!(result.contains_key(&PathBuf::from("/a/1.jpg")));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("1/250")), Some("1/250".to_string()));
        assert_eq!(value_to_string(&json!(2.8)), Some("2.8".to_string()));
        assert_eq!(value_to_string(&json!(null)), None);
    }
}
