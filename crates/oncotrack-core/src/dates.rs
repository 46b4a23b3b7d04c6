//! Date normalization and treatment-duration calculation.
//!
//! The store's historical data mixes year-month representations freely:
//! `2025-1`, `2025/01`, full ISO timestamps, and occasional garbage. The
//! normalizer canonicalizes whatever it can into a fixed-width `YYYY/MM`
//! token and yields a sentinel for the rest; it never errors. Unparseable
//! values are tolerated by design, not rejected.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

use crate::models::CaseStatus;

/// Placeholder the store uses for an absent date.
const EMPTY_MARKER: &str = "-";

/// A calendar year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The current calendar year-month, evaluated at call time.
    pub fn now() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Parse a loosely-formatted date-like value.
    ///
    /// First tries the leading pattern `YYYY` + `-`/`/` + 1-2 digits;
    /// trailing characters after the match are ignored, and the month is
    /// taken as written without range validation (matching the lenient
    /// behavior the historical data relies on). Failing that, falls back
    /// to a general date parse and uses that date's calendar year/month.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() || s == EMPTY_MARKER {
            return None;
        }
        parse_prefix(s).or_else(|| parse_general(s))
    }

    /// Canonical `YYYY/MM` token, month zero-padded.
    pub fn token(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }

    /// Whole months from `self` to `end` (may be negative).
    pub fn months_until(&self, end: YearMonth) -> i64 {
        i64::from(end.year - self.year) * 12 + i64::from(end.month) - i64::from(self.month)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

/// Leading `YYYY[-/]M` or `YYYY[-/]MM` extraction.
fn parse_prefix(s: &str) -> Option<YearMonth> {
    let bytes = s.as_bytes();
    if bytes.len() < 6 {
        return None;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes[4] != b'-' && bytes[4] != b'/' {
        return None;
    }
    if !bytes[5].is_ascii_digit() {
        return None;
    }
    let month_len = if bytes.len() > 6 && bytes[6].is_ascii_digit() {
        2
    } else {
        1
    };
    let year = s[..4].parse().ok()?;
    let month = s[5..5 + month_len].parse().ok()?;
    Some(YearMonth { year, month })
}

/// General-purpose fallback for values the prefix pattern rejects, e.g.
/// RFC 3339/2822 timestamps the spreadsheet backend sometimes emits.
fn parse_general(s: &str) -> Option<YearMonth> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        let d = dt.date_naive();
        return Some(YearMonth::new(d.year(), d.month()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        let d = dt.date_naive();
        return Some(YearMonth::new(d.year(), d.month()));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(YearMonth::new(dt.year(), dt.month()));
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(YearMonth::new(d.year(), d.month()));
        }
    }
    None
}

/// Canonicalize a date-like value into a `YYYY/MM` token.
///
/// Empty/absent input, the `"-"` placeholder, and unparseable values all
/// yield `None`. Pure and idempotent: a canonical token re-normalizes to
/// itself.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    YearMonth::parse(raw?).map(|ym| ym.token())
}

/// Display-context variant: absent input renders as `"-"`, and an
/// unparseable value is shown as-is rather than hidden.
pub fn normalize_for_display(raw: Option<&str>) -> String {
    let s = match raw {
        Some(s) if !s.trim().is_empty() && s.trim() != EMPTY_MARKER => s.trim(),
        _ => return EMPTY_MARKER.to_string(),
    };
    match YearMonth::parse(s) {
        Some(ym) => ym.token(),
        None => s.to_string(),
    }
}

/// Elapsed whole months of treatment, relative to the current month for
/// active cases. See [`months_elapsed_at`] for the pure variant.
pub fn months_elapsed(
    start: &str,
    end: Option<&str>,
    status: CaseStatus,
) -> Option<u32> {
    months_elapsed_at(start, end, status, YearMonth::now())
}

/// Elapsed whole months between `start` and an end determined by `status`:
/// the discharge date for discharged cases, `now` for active ones.
///
/// Returns `None` when the start does not parse, or when a discharged case
/// has no parseable discharge date (an indeterminate duration must never
/// read as 0). Negative spans clamp to 0: a discharge predating enrollment
/// is a data-entry artifact, not an error here.
pub fn months_elapsed_at(
    start: &str,
    end: Option<&str>,
    status: CaseStatus,
    now: YearMonth,
) -> Option<u32> {
    let start = YearMonth::parse(start)?;
    let end = match status {
        CaseStatus::Discharged => YearMonth::parse(end?.trim())?,
        CaseStatus::Active => now,
    };
    let months = start.months_until(end);
    Some(months.max(0) as u32)
}
