use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

lazy_static::lazy_static! {
    // Export file names embed the session time as 2025.11.03-20.05.18.
    static ref FILE_NAME_DATE_TOKEN: Regex =
        Regex::new(r"(\d{4})\.(\d{2})\.(\d{2})-(\d{2})\.(\d{2})\.(\d{2})")
            .expect("file name date token pattern is valid");
}

// In-file date columns show up in several layouts depending on the export
// version and locale settings.
const IN_FILE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y.%m.%d-%H.%M.%S",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Resolve the authoritative timestamp for one record.
///
/// Priority: file-name token, then an in-file date field, then the time the
/// ingestion ran. The file name wins because it is always present in
/// detailed logs and immune to in-file corruption. Resolution never fails.
pub fn resolve_timestamp(
    file_name: &str,
    in_file_date: Option<&str>,
    ingested_at: DateTime<Utc>,
) -> DateTime<Utc> {
    if let Some(timestamp) = timestamp_from_file_name(file_name) {
        return timestamp;
    }

    if let Some(timestamp) = in_file_date.and_then(parse_in_file_date) {
        return timestamp;
    }

    ingested_at
}

/// Parse the `YYYY.MM.DD-HH.MM.SS` token embedded in export file names.
pub fn timestamp_from_file_name(file_name: &str) -> Option<DateTime<Utc>> {
    let captures = FILE_NAME_DATE_TOKEN.captures(file_name)?;

    // 2025.11.03-20.05.18 -> 2025-11-03 20:05:18 after separator conversion.
    let canonical = format!(
        "{}-{}-{} {}:{}:{}",
        &captures[1], &captures[2], &captures[3], &captures[4], &captures[5], &captures[6]
    );

    NaiveDateTime::parse_from_str(&canonical, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_in_file_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    IN_FILE_DATE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}
