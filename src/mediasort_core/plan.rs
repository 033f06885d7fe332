use crate::mediasort_core::classify::classify;
use crate::mediasort_core::record::{Category, ClassifiedFile, FileRecord, TagMap};
use crate::mediasort_core::sidecar::SiblingIndex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A single planned transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

/// Ordered source -> destination mapping. Each source appears at most once.
#[derive(Debug, Default)]
pub struct MovePlan {
    moves: Vec<PlannedMove>,
    sources: HashSet<PathBuf>,
}

impl MovePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a routed file. Returns `false` if the source was already planned;
    /// the earlier entry is kept.
    pub fn insert(&mut self, file: ClassifiedFile) -> bool {
        let Some(destination) = file.destination else {
            return false;
        };
        if !self.sources.insert(file.path.clone()) {
            log::debug!(
                "{} already planned, ignoring second route to {}",
                file.path.display(),
                destination.display()
            );
            return false;
        }
        log::debug!(
            "Planned {} {} -> {}",
            file.category,
            file.path.display(),
            destination.display()
        );
        self.moves.push(PlannedMove {
            source: file.path,
            destination,
            category: file.category,
        });
        true
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.sources.contains(source)
    }

    pub fn moves(&self) -> &[PlannedMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        self.moves.iter().filter(|m| m.category == category).count()
    }

    /// Discovered paths that never became a plan key, in discovery order.
    pub fn unplanned<'a>(&self, discovered: &'a [PathBuf]) -> Vec<&'a PathBuf> {
        discovered.iter().filter(|p| !self.contains(p)).collect()
    }
}

/// Classify every discovered path and collect the routed ones into a plan.
///
/// Paths are visited in sorted order so the plan is deterministic; a file that
/// is reached both as a sidecar and on its own keeps whichever route came first.
pub fn build_plan(
    discovered: &[PathBuf],
    mut metadata: HashMap<PathBuf, TagMap>,
    dest_root: &Path,
) -> MovePlan {
    let index = SiblingIndex::from_paths(discovered);

    let mut ordered: Vec<&PathBuf> = discovered.iter().collect();
    ordered.sort();

    let mut plan = MovePlan::new();
    for path in ordered {
        let tags = metadata.remove(path).unwrap_or_default();
        let record = FileRecord::new(path.clone(), tags);

        for file in classify(&record, dest_root, &index) {
            plan.insert(file);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_every_path_is_planned_or_unplanned() {
        let discovered = vec![
            PathBuf::from("/src/a/IMG_1.jpg"),
            PathBuf::from("/src/a/IMG_1.xmp"),
            PathBuf::from("/src/a/notes.txt"),
            PathBuf::from("/src/b/clip.mp4"),
        ];
        let mut metadata = HashMap::new();
        metadata.insert(
            PathBuf::from("/src/a/IMG_1.jpg"),
            tags(&[("File:MIMEType", "image/jpeg"), ("EXIF:CreateDate", "2022:02:03 04:05:06")]),
        );
        metadata.insert(
            PathBuf::from("/src/a/IMG_1.xmp"),
            tags(&[("File:MIMEType", "application/rdf+xml")]),
        );
        metadata.insert(
            PathBuf::from("/src/b/clip.mp4"),
            tags(&[("File:MIMEType", "video/mp4")]),
        );

        let plan = build_plan(&discovered, metadata, Path::new("/dest"));
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.count(Category::PrimaryImage), 1);
        assert_eq!(plan.count(Category::Sidecar), 1);
        assert_eq!(plan.count(Category::Video), 1);
        assert_eq!(plan.unplanned(&discovered), vec![&PathBuf::from("/src/a/notes.txt")]);

        let xmp = plan
            .moves()
            .iter()
            .find(|m| m.source.ends_with("IMG_1.xmp"))
            .unwrap();
        assert_eq!(xmp.destination, PathBuf::from("/dest/image/2022-02-03/IMG_1.xmp"));

        for path in &discovered {
            assert!(plan.contains(path) ^ plan.unplanned(&discovered).contains(&path));
        }
    }

    #[test]
    fn test_first_route_wins_for_raw_with_jpeg() {
        let discovered = vec![PathBuf::from("/s/IMG_1.jpg"), PathBuf::from("/s/IMG_1.arw")];
        let mut metadata = HashMap::new();
        metadata.insert(
            PathBuf::from("/s/IMG_1.arw"),
            tags(&[("File:MIMEType", "image/x-sony-arw"), ("EXIF:CreateDate", "2021:01:01 10:00:00")]),
        );
        metadata.insert(
            PathBuf::from("/s/IMG_1.jpg"),
            tags(&[("File:MIMEType", "image/jpeg"), ("EXIF:CreateDate", "2021:01:01 10:00:00")]),
        );

        let plan = build_plan(&discovered, metadata, Path::new("/d"));
        assert_eq!(plan.len(), 2);
        // IMG_1.arw sorts first and is planned as a primary image.
        assert_eq!(plan.moves()[0].source, PathBuf::from("/s/IMG_1.arw"));
        assert_eq!(plan.moves()[0].category, Category::PrimaryImage);
        assert_eq!(plan.moves()[1].category, Category::PrimaryImage);
    }

    #[test]
    fn test_no_metadata_leaves_everything_unplanned() {
        let discovered = vec![PathBuf::from("/s/IMG_1.jpg"), PathBuf::from("/s/clip.mp4")];
        let plan = build_plan(&discovered, HashMap::new(), Path::new("/d"));
        assert!(plan.is_empty());
        assert_eq!(plan.unplanned(&discovered).len(), 2);
    }

    #[test]
    fn test_insert_ignores_unrecognized() {
        let mut plan = MovePlan::new();
        assert!(!plan.insert(ClassifiedFile::unrecognized(Path::new("/x"))));
        assert!(plan.is_empty());
    }
}
