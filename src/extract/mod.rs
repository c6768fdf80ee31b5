pub mod detailed;
pub mod summary;

pub use detailed::extract_detailed_log;
pub use summary::extract_summary_table;

/// Tolerant numeric parse shared by both extractors.
///
/// Handles locale-style decimal commas ("1234,5"), quoted cells, percent
/// suffixes and trailing unit letters ("0.45s"). Returns `None` rather than
/// an error so callers can normalize undetermined fields to zero.
pub(crate) fn parse_flexible_number(raw: &str) -> Option<f64> {
    let mut value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return None;
    }

    value = value.trim_end_matches('%').trim();
    value = value.trim_end_matches(|character: char| character.is_ascii_alphabetic());
    let mut normalized = value.trim().to_string();

    if normalized.contains(',') {
        if normalized.contains('.') {
            // Comma as thousands separator alongside a decimal point.
            normalized = normalized.replace(',', "");
        } else {
            // Comma as localized decimal separator.
            normalized = normalized.replace(',', ".");
        }
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Accuracy cells arrive either as a fraction (0.78) or a percentage (78).
pub(crate) fn normalize_accuracy(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.min(1.0)
}

/// Elapsed seconds from a per-event timestamp cell.
///
/// Accepts clock-style values ("00:01:23.250" or "01:23.250") and plain
/// second counts ("83.25").
pub(crate) fn parse_elapsed_seconds(raw: &str) -> Option<f64> {
    let value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return None;
    }

    if !value.contains(':') {
        return parse_flexible_number(value);
    }

    let mut total_seconds = 0.0;
    for part in value.split(':') {
        let component = parse_flexible_number(part)?;
        total_seconds = total_seconds * 60.0 + component;
    }

    Some(total_seconds).filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

/// Comma split that keeps quoted cells intact, so localized decimal commas
/// inside quotes do not break the row apart.
pub(crate) fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut in_quotes = false;
    let mut cell_start = 0;

    for (index, character) in line.char_indices() {
        match character {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(line[cell_start..index].trim());
                cell_start = index + 1;
            }
            _ => {}
        }
    }

    cells.push(line[cell_start..].trim());
    cells
}

#[cfg(test)]
mod tests {
    use super::{normalize_accuracy, parse_elapsed_seconds, parse_flexible_number};

    #[test]
    fn parses_decimal_comma_as_decimal_point() {
        assert_eq!(parse_flexible_number("1234,5"), Some(1234.5));
    }

    #[test]
    fn parses_plain_and_quoted_numbers() {
        assert_eq!(parse_flexible_number("812.5"), Some(812.5));
        assert_eq!(parse_flexible_number("\"240\""), Some(240.0));
    }

    #[test]
    fn strips_unit_and_percent_suffixes() {
        assert_eq!(parse_flexible_number("0.45s"), Some(0.45));
        assert_eq!(parse_flexible_number("78%"), Some(78.0));
    }

    #[test]
    fn treats_comma_as_thousands_separator_when_point_present() {
        assert_eq!(parse_flexible_number("1,234.5"), Some(1234.5));
    }

    #[test]
    fn rejects_non_numeric_cells() {
        assert_eq!(parse_flexible_number("n/a"), None);
        assert_eq!(parse_flexible_number(""), None);
    }

    #[test]
    fn normalizes_percentage_scale_accuracy() {
        assert_eq!(normalize_accuracy(78.0), 0.78);
        assert_eq!(normalize_accuracy(0.78), 0.78);
        assert_eq!(normalize_accuracy(-3.0), 0.0);
    }

    #[test]
    fn keeps_quoted_decimal_commas_in_one_cell() {
        let cells = super::split_cells("Sixshot,\"1234,5\",144");
        assert_eq!(cells, vec!["Sixshot", "\"1234,5\"", "144"]);
    }

    #[test]
    fn parses_clock_style_elapsed_seconds() {
        assert_eq!(parse_elapsed_seconds("00:01:23.250"), Some(83.25));
        assert_eq!(parse_elapsed_seconds("01:23.250"), Some(83.25));
        assert_eq!(parse_elapsed_seconds("83.25"), Some(83.25));
    }
}
