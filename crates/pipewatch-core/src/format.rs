// Rust guideline compliant 2026-02-06

//! Pure formatting helpers used by the renderer.
//!
//! Every function here is deterministic and side-effect free; each returns a
//! string of bounded length regardless of its input size.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Maximum number of rows shown in a single rendered row list.
pub const ROW_DISPLAY_LIMIT: usize = 3;

/// Maximum characters of a single rendered row.
pub const MAX_ROW_CHARS: usize = 80;

/// Separator between rendered rows.
const ROW_SEPARATOR: &str = ", ";

/// Formats an elapsed duration in a short human unit.
///
/// # Arguments
///
/// * `elapsed` - Elapsed time; negative values are treated as zero
///
/// # Returns
///
/// `"850ms"`, `"2.3s"`, `"1m 5s"` or `"1h 2m"` depending on magnitude.
/// Smaller units are truncated, not rounded.
pub fn format_duration(elapsed: Duration) -> String {
    let ms = elapsed.num_milliseconds().max(0);

    if ms < 1_000 {
        return format!("{}ms", ms);
    }
    // Truncated: 59_999ms must read 59.9s, never 60.0s.
    if ms < 60_000 {
        return format!("{}.{}s", ms / 1_000, (ms % 1_000) / 100);
    }

    let secs = ms / 1_000;
    if secs < 3_600 {
        return format!("{}m {}s", secs / 60, secs % 60);
    }
    format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60)
}

/// Formats a point in time as a fixed-width UTC timestamp.
///
/// # Returns
///
/// `YYYY-MM-DD HH:MM:SS.mmm`, always 23 characters for years 0-9999.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Renders one row as compact JSON, cut to [`MAX_ROW_CHARS`] characters.
pub fn format_row(row: &Value) -> String {
    let rendered = row.to_string();
    if rendered.chars().count() <= MAX_ROW_CHARS {
        return rendered;
    }
    let mut cut: String = rendered.chars().take(MAX_ROW_CHARS - 1).collect();
    cut.push('…');
    cut
}

/// Renders a row list, showing at most [`ROW_DISPLAY_LIMIT`] rows.
pub fn format_rows(rows: &[Value]) -> String {
    let shown: Vec<String> = rows
        .iter()
        .take(ROW_DISPLAY_LIMIT)
        .map(format_row)
        .collect();
    summarize(&shown, rows.len())
}

/// Joins at most `limit` entries and notes how many were left out.
///
/// # Arguments
///
/// * `entries` - Rendered entries in order
/// * `limit` - Maximum entries to show
///
/// # Returns
///
/// The joined entries, followed by `" ...and N more"` only when
/// `entries.len() > limit`.
pub fn truncate(entries: &[String], limit: usize) -> String {
    let shown = &entries[..entries.len().min(limit)];
    summarize(shown, entries.len())
}

/// Joins already-selected entries and notes the omitted remainder of `total`.
///
/// Used where only a sample of a longer sequence is kept in memory.
pub fn summarize(shown: &[String], total: usize) -> String {
    let mut out = shown.join(ROW_SEPARATOR);
    let omitted = total.saturating_sub(shown.len());
    if omitted > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("...and {} more", omitted));
    }
    out
}

/// Chooses the singular or plural noun for a count.
///
/// # Returns
///
/// `"1 row"`, `"0 rows"`, `"3 rows"`.
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn entries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{}", i)).collect()
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::milliseconds(0)), "0ms");
        assert_eq!(format_duration(Duration::milliseconds(850)), "850ms");
        assert_eq!(format_duration(Duration::milliseconds(2_340)), "2.3s");
        assert_eq!(format_duration(Duration::milliseconds(65_000)), "1m 5s");
        assert_eq!(format_duration(Duration::milliseconds(59_950)), "59.9s");
        assert_eq!(format_duration(Duration::milliseconds(59_999)), "59.9s");
        assert_eq!(format_duration(Duration::milliseconds(60_000)), "1m 0s");
        assert_eq!(format_duration(Duration::milliseconds(1_000)), "1.0s");
        assert_eq!(format_duration(Duration::milliseconds(3_720_000)), "1h 2m");
    }

    #[test]
    fn test_format_duration_negative_is_zero() {
        assert_eq!(format_duration(Duration::milliseconds(-40)), "0ms");
    }

    #[test]
    fn test_format_timestamp_fixed_width() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()
            + Duration::milliseconds(999);
        assert_eq!(format_timestamp(early), "2024-01-02 03:04:05.000");
        assert_eq!(format_timestamp(late), "2024-12-31 23:59:59.999");
        assert_eq!(format_timestamp(early).len(), format_timestamp(late).len());
    }

    #[test]
    fn test_format_row_compact_json() {
        assert_eq!(format_row(&json!("test")), "\"test\"");
        assert_eq!(format_row(&json!({"id": 1})), "{\"id\":1}");
    }

    #[test]
    fn test_format_row_is_bounded() {
        let long = json!("x".repeat(500));
        let rendered = format_row(&long);
        assert_eq!(rendered.chars().count(), MAX_ROW_CHARS);
        assert!(rendered.ends_with('…'));
    }

    #[test]
    fn test_truncate_below_limit() {
        assert_eq!(truncate(&entries(2), 3), "r0, r1");
    }

    #[test]
    fn test_truncate_exactly_at_limit_has_no_suffix() {
        let out = truncate(&entries(3), 3);
        assert_eq!(out, "r0, r1, r2");
        assert!(!out.contains("more"));
    }

    #[test]
    fn test_truncate_above_limit() {
        assert_eq!(truncate(&entries(10), 3), "r0, r1, r2 ...and 7 more");
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate(&[], 3), "");
    }

    #[test]
    fn test_truncate_zero_limit() {
        assert_eq!(truncate(&entries(2), 0), "...and 2 more");
    }

    #[test]
    fn test_format_rows_uses_display_limit() {
        let rows = vec![json!("test"); 10];
        assert_eq!(
            format_rows(&rows),
            "\"test\", \"test\", \"test\" ...and 7 more"
        );
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "row", "rows"), "0 rows");
        assert_eq!(pluralize(1, "row", "rows"), "1 row");
        assert_eq!(pluralize(2, "batch", "batches"), "2 batches");
    }
}
