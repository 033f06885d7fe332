use crate::mediasort_core::error::{Result, SortError};
use crate::mediasort_core::record::TagMap;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Creation-date tags in priority order. The first one present decides.
pub const DATE_TAGS: &[&str] = &[
    "EXIF:CreateDate",
    "EXIF:DateTimeOriginal",
    "QuickTime:CreateDate",
    "QuickTime:MediaCreateDate",
];

/// Folder token used when no capture date could be determined.
pub const NO_DATE: &str = "no-date";

/// Date format used in EXIF and QuickTime data.
const EXIF_DATE_FORMAT: &[FormatItem] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// Date format for destination folder names.
const FOLDER_DATE_FORMAT: &[FormatItem] = format_description!("[year]-[month]-[day]");

/// Length of `YYYY:MM:DD HH:MM:SS`.
const EXIF_DATE_LEN: usize = 19;

/// Return the capture date from the first present date tag, if it parses.
pub fn capture_date(tags: &TagMap) -> Option<Date> {
    let (tag, value) = DATE_TAGS
        .iter()
        .find_map(|tag| tags.get(*tag).map(|value| (*tag, value)))?;

    match parse_exif_date(value) {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("Ignoring {} value {:?}: {}", tag, value, e);
            None
        }
    }
}

/// Folder name for a capture date: `YYYY-MM-DD`, or `no-date`.
pub fn folder_token(date: Option<Date>) -> String {
    date.and_then(|d| d.format(FOLDER_DATE_FORMAT).ok())
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Parse an EXIF date string, keeping the calendar date as written.
///
/// A trailing UTC offset (`+09:00`, `-0500`, `Z`) or fractional seconds are
/// accepted and ignored; the offset never shifts the date.
fn parse_exif_date(value: &str) -> Result<Date> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SortError::InvalidDateFormat("empty date".to_string()));
    }

    let (date_time, rest) = value
        .split_at_checked(EXIF_DATE_LEN)
        .ok_or_else(|| SortError::InvalidDateFormat(format!("too short: {value}")))?;

    if !is_valid_suffix(rest) {
        return Err(SortError::InvalidDateFormat(format!(
            "unexpected trailing data: {rest}"
        )));
    }

    let parsed = PrimitiveDateTime::parse(date_time, EXIF_DATE_FORMAT)
        .map_err(|e| SortError::InvalidDateFormat(e.to_string()))?;

    Ok(parsed.date())
}

/// Accept `[.fraction][offset]` after the seconds field.
fn is_valid_suffix(rest: &str) -> bool {
    let rest = match rest.strip_prefix('.') {
        Some(fraction) => {
            let digits = fraction.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return false;
            }
            &fraction[digits..]
        }
        None => rest,
    };

    if rest.is_empty() || rest == "Z" {
        return true;
    }

    let Some(offset) = rest.strip_prefix('+').or_else(|| rest.strip_prefix('-')) else {
        return false;
    };
    let digits: String = offset.chars().filter(|c| *c != ':').collect();
    digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit())
}
