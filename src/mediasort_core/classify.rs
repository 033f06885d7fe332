use crate::mediasort_core::date::{capture_date, folder_token};
use crate::mediasort_core::record::{Category, ClassifiedFile, FileRecord};
use crate::mediasort_core::sidecar::{SiblingIndex, find_sidecars};
use std::path::{Path, PathBuf};

/// Extensions (lowercase) accepted for files whose MIME type is `image/*`.
pub const PRIMARY_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "arw", "png", "tiff"];

/// Destination folder for videos, under the destination root.
pub const VIDEO_FOLDER: &str = "video";

/// Destination folder for images and their sidecars, under the destination root.
pub const IMAGE_FOLDER: &str = "image";

/// Decide the category of a file from its MIME type and extension.
pub fn categorize(record: &FileRecord) -> Category {
    let mime = record.mime_type().unwrap_or_default();

    if mime.starts_with("video") {
        return Category::Video;
    }

    if mime.starts_with("image")
        && record
            .extension()
            .is_some_and(|ext| PRIMARY_IMAGE_EXTENSIONS.contains(&ext.as_str()))
    {
        return Category::PrimaryImage;
    }

    Category::Unrecognized
}

/// Classify a file and, for primary images, its sidecars.
///
/// The first entry is always the file itself; any further entries are sidecars
/// routed into the same folder.
pub fn classify(record: &FileRecord, dest_root: &Path, index: &SiblingIndex) -> Vec<ClassifiedFile> {
    let category = categorize(record);
    let folder = match category {
        Category::Video => VIDEO_FOLDER,
        Category::PrimaryImage => IMAGE_FOLDER,
        Category::Sidecar | Category::Unrecognized => {
            return vec![ClassifiedFile::unrecognized(&record.path)];
        }
    };

    let Some(file_name) = record.path.file_name() else {
        return vec![ClassifiedFile::unrecognized(&record.path)];
    };

    let date = capture_date(&record.tags);
    if date.is_none() {
        log::warn!("Couldn't get creation date for file: {}", record.path.display());
    }

    let dest_dir = dest_root.join(folder).join(folder_token(date));
    let mut classified = vec![ClassifiedFile::routed(
        record.path.clone(),
        category,
        dest_dir.join(file_name),
    )];

    if category == Category::PrimaryImage {
        classified.extend(find_sidecars(&record.path, index).into_iter().filter_map(
            |sidecar: PathBuf| {
                let name = sidecar.file_name()?.to_owned();
                Some(ClassifiedFile::routed(
                    sidecar,
                    Category::Sidecar,
                    dest_dir.join(name),
                ))
            },
        ));
    }

    classified
}
