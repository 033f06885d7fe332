use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// How a sidecar's file name is derived from its primary image's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarMatch {
    /// `IMG_1.jpg` -> `IMG_1.xmp`
    ReplaceExtension,
    /// `IMG_1.jpg` -> `IMG_1.jpg.xmp`
    AppendExtension,
}

/// Sidecar extensions (lowercase) and the naming schemes they are looked up with.
pub const SIDECAR_RULES: &[(&str, SidecarMatch)] = &[
    ("xmp", SidecarMatch::ReplaceExtension), // Adobe XMP sidecar
    ("dng", SidecarMatch::ReplaceExtension), // Raw negative
    ("arw", SidecarMatch::ReplaceExtension), // Sony raw
    ("xmp", SidecarMatch::AppendExtension),
    ("dng", SidecarMatch::AppendExtension),
    ("arw", SidecarMatch::AppendExtension),
];

/// File names of every discovered file, grouped by parent directory.
///
/// Built once from the walk so sidecar lookup never lists a directory again.
#[derive(Debug, Default)]
pub struct SiblingIndex {
    dirs: HashMap<PathBuf, BTreeSet<String>>,
}

impl SiblingIndex {
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut dirs: HashMap<PathBuf, BTreeSet<String>> = HashMap::new();
        for path in paths {
            let (Some(parent), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
            else {
                continue;
            };
            dirs.entry(parent.to_path_buf())
                .or_default()
                .insert(name.to_string());
        }
        Self { dirs }
    }

    fn siblings(&self, dir: &Path) -> Option<&BTreeSet<String>> {
        self.dirs.get(dir)
    }
}

/// Find the sidecars of a primary image among its directory siblings.
///
/// The base name must match exactly; the sidecar extension matches in any case.
/// Results are in rule order, each path at most once.
pub fn find_sidecars(primary: &Path, index: &SiblingIndex) -> Vec<PathBuf> {
    let mut sidecars = Vec::new();

    let (Some(parent), Some(name)) = (
        primary.parent(),
        primary.file_name().and_then(|n| n.to_str()),
    ) else {
        return sidecars;
    };
    let Some(siblings) = index.siblings(parent) else {
        return sidecars;
    };
    let stem = primary
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    for (ext, strategy) in SIDECAR_RULES {
        let base = match strategy {
            SidecarMatch::ReplaceExtension => stem,
            SidecarMatch::AppendExtension => name,
        };

        for sibling in siblings {
            if sibling == name || !matches_sidecar(sibling, base, ext) {
                continue;
            }
            let path = parent.join(sibling);
            if !sidecars.contains(&path) {
                sidecars.push(path);
            }
        }
    }

    sidecars
}

/// `candidate == "{base}.{ext}"`, comparing `ext` case-insensitively.
fn matches_sidecar(candidate: &str, base: &str, ext: &str) -> bool {
    candidate
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| rest.eq_ignore_ascii_case(ext))
}
