const DETAILED_HEADER_TOKEN: &str = "Kill #";
const SUMMARY_HEADER_TOKEN: &str = "Scenario Name";

// Some exports prepend banner rows before the per-event header, so the
// substring fallback scans a bounded leading region instead of line one.
const CLASSIFY_SCAN_LINES: usize = 12;

/// Which of the two known export schemas a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    DetailedLog,
    SummaryTable,
    Unrecognized,
}

/// Pure classification over the raw text of one export file.
pub fn classify_format(text: &str) -> LogFormat {
    if is_detailed_log(text) {
        return LogFormat::DetailedLog;
    }

    if is_summary_table(text) {
        return LogFormat::SummaryTable;
    }

    LogFormat::Unrecognized
}

fn is_detailed_log(text: &str) -> bool {
    // Exact match on the first cell of an early row is the primary signal.
    if text
        .lines()
        .take(CLASSIFY_SCAN_LINES)
        .any(|line| first_cell(line) == DETAILED_HEADER_TOKEN)
    {
        return true;
    }

    // Looser substring fallback for files with leading metadata rows.
    text.lines()
        .take(CLASSIFY_SCAN_LINES)
        .any(|line| line.contains(DETAILED_HEADER_TOKEN))
}

fn is_summary_table(text: &str) -> bool {
    let Some(header_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };

    header_line
        .split(',')
        .any(|cell| cell.trim() == SUMMARY_HEADER_TOKEN)
}

fn first_cell(line: &str) -> &str {
    line.split(',').next().unwrap_or("").trim()
}
