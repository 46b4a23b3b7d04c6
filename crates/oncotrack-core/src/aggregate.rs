//! Aggregation over an already-filtered case collection.
//!
//! Ranked frequency tables for the top-N cards, city/status breakdowns
//! for charts, a least-squares trend line over monthly enrollment counts,
//! and the average treatment duration. Blank attribute values count under
//! a "No data" bucket instead of vanishing.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dates::YearMonth;
use crate::models::PatientCase;

/// Bucket label for absent/blank attribute values.
pub const NO_DATA_LABEL: &str = "No data";

/// A case attribute that aggregations can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseAttribute {
    Coordinator,
    City,
    Physician,
    Insurer,
    Institution,
    DispensingPoint,
    Distributor,
    Indication,
    Dosage,
    Sector,
    Status,
}

impl CaseAttribute {
    /// Stringified attribute value, trimmed; blank becomes
    /// [`NO_DATA_LABEL`] so it stays countable.
    pub fn value_of(&self, case: &PatientCase) -> String {
        let raw = match self {
            CaseAttribute::Coordinator => case.coordinator.trim().to_string(),
            CaseAttribute::City => case.city.trim().to_string(),
            CaseAttribute::Physician => case.physician.trim().to_string(),
            CaseAttribute::Insurer => case.insurer.trim().to_string(),
            CaseAttribute::Institution => case.institution.trim().to_string(),
            CaseAttribute::DispensingPoint => case.dispensing_point.trim().to_string(),
            CaseAttribute::Distributor => case.distributor.trim().to_string(),
            CaseAttribute::Indication => case.indication.trim().to_string(),
            CaseAttribute::Dosage => case.dosage.trim().to_string(),
            CaseAttribute::Sector => case.sector.to_string(),
            CaseAttribute::Status => case.status.to_string(),
        };
        if raw.is_empty() {
            NO_DATA_LABEL.to_string()
        } else {
            raw
        }
    }
}

/// One value of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub value: String,
    pub count: usize,
}

/// Full frequency table for an attribute, sorted descending by count.
/// Ties keep first-encountered order (stable sort over insertion order).
pub fn frequency_table(cases: &[PatientCase], attr: CaseAttribute) -> Vec<CountEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for case in cases {
        let value = attr.value_of(case);
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }
    let mut table: Vec<CountEntry> = order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            CountEntry { value, count }
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table
}

/// Top `limit` attribute values by count.
pub fn top_by_attribute(
    cases: &[PatientCase],
    attr: CaseAttribute,
    limit: usize,
) -> Vec<CountEntry> {
    let mut table = frequency_table(cases, attr);
    table.truncate(limit);
    table
}

/// Case count per city, descending.
pub fn group_by_city(cases: &[PatientCase]) -> Vec<CountEntry> {
    frequency_table(cases, CaseAttribute::City)
}

/// Case count per status, descending.
pub fn group_by_status(cases: &[PatientCase]) -> Vec<CountEntry> {
    frequency_table(cases, CaseAttribute::Status)
}

/// One month bucket of the enrollment trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Canonical `YYYY/MM` bucket key.
    pub bucket: String,
    /// Raw enrollment count in the bucket.
    pub count: usize,
    /// Fitted trend value, `max(0, ..)` and rounded to 1 decimal.
    pub trend: f64,
}

/// Bucket cases by normalized enrollment month and fit an ordinary
/// least-squares line over (bucket index, count).
///
/// Cases whose enrollment date does not normalize are left out. With
/// fewer than two buckets the trend equals the raw count; no regression
/// is attempted.
pub fn monthly_trend(cases: &[PatientCase]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for case in cases {
        if let Some(token) = case.normalized_enrollment() {
            *buckets.entry(token).or_insert(0) += 1;
        }
    }

    let points: Vec<(String, usize)> = buckets.into_iter().collect();
    let n = points.len();
    if n < 2 {
        return points
            .into_iter()
            .map(|(bucket, count)| TrendPoint {
                bucket,
                count,
                trend: count as f64,
            })
            .collect();
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for (i, (_, count)) in points.iter().enumerate() {
        let x = i as f64;
        let y = *count as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let nf = n as f64;
    let slope = (nf * sum_xy - sum_x * sum_y) / (nf * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / nf;

    points
        .into_iter()
        .enumerate()
        .map(|(i, (bucket, count))| TrendPoint {
            bucket,
            count,
            trend: round1(slope * i as f64 + intercept).max(0.0),
        })
        .collect()
}

/// Mean treatment duration in months over the cases where a duration is
/// computable, rounded to 1 decimal. 0 when nothing is computable.
pub fn average_duration_at(cases: &[PatientCase], now: YearMonth) -> f64 {
    let durations: Vec<u32> = cases
        .iter()
        .filter_map(|c| c.duration_months_at(now))
        .collect();
    if durations.is_empty() {
        return 0.0;
    }
    let total: u32 = durations.iter().sum();
    round1(f64::from(total) / durations.len() as f64)
}

/// [`average_duration_at`] evaluated against the current calendar month.
pub fn average_duration(cases: &[PatientCase]) -> f64 {
    average_duration_at(cases, YearMonth::now())
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseStatus, Sector};

    fn case(id: &str, city: &str, enrollment: &str) -> PatientCase {
        PatientCase {
            id: id.into(),
            coordinator: "Ana".into(),
            city: city.into(),
            physician: "Dr. Soto".into(),
            insurer: "Rimac".into(),
            sector: Sector::Private,
            institution: "Clinica".into(),
            dispensing_point: "Farmacia".into(),
            distributor: "QS".into(),
            indication: "QSDB03".into(),
            dosage: "200mg".into(),
            enrollment_date: enrollment.into(),
            discharge_date: None,
            status: CaseStatus::Active,
        }
    }

    #[test]
    fn test_frequency_table_descending() {
        let cases = vec![
            case("1", "Lima", "2024-01"),
            case("2", "Cusco", "2024-01"),
            case("3", "Lima", "2024-01"),
        ];
        let table = group_by_city(&cases);
        assert_eq!(table[0].value, "Lima");
        assert_eq!(table[0].count, 2);
        assert_eq!(table[1].value, "Cusco");
    }

    #[test]
    fn test_tie_keeps_first_seen_order() {
        let cases = vec![
            case("1", "Cusco", "2024-01"),
            case("2", "Lima", "2024-01"),
            case("3", "Arequipa", "2024-01"),
        ];
        let table = group_by_city(&cases);
        let values: Vec<&str> = table.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["Cusco", "Lima", "Arequipa"]);
    }

    #[test]
    fn test_top_by_attribute_respects_limit() {
        let cases: Vec<PatientCase> = (0..10)
            .map(|i| case(&i.to_string(), &format!("City{i}"), "2024-01"))
            .collect();
        let top = top_by_attribute(&cases, CaseAttribute::City, 5);
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_blank_value_counts_as_no_data() {
        let cases = vec![case("1", "  ", "2024-01"), case("2", "Lima", "2024-01")];
        let table = group_by_city(&cases);
        assert!(table.iter().any(|e| e.value == NO_DATA_LABEL && e.count == 1));
    }

    #[test]
    fn test_monthly_trend_buckets_sorted_ascending() {
        let cases = vec![
            case("1", "Lima", "2024-03"),
            case("2", "Lima", "2024-01"),
            case("3", "Lima", "2024-01"),
            case("4", "Lima", "garbage"),
        ];
        let trend = monthly_trend(&cases);
        let buckets: Vec<&str> = trend.iter().map(|p| p.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["2024/01", "2024/03"]);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[1].count, 1);
    }

    #[test]
    fn test_trend_line_fits_monotonic_counts() {
        // Buckets with counts [1, 2, 3, 4]: the OLS line is y = x + 1.
        let mut cases = Vec::new();
        let mut id = 0;
        for (month, count) in [(1, 1), (2, 2), (3, 3), (4, 4)] {
            for _ in 0..count {
                id += 1;
                cases.push(case(&id.to_string(), "Lima", &format!("2024-{month}")));
            }
        }
        let trend = monthly_trend(&cases);
        assert_eq!(trend.len(), 4);
        for (i, point) in trend.iter().enumerate() {
            let expected = i as f64 + 1.0;
            assert!(
                (point.trend - expected).abs() < 0.05,
                "bucket {}: trend {} vs expected {}",
                point.bucket,
                point.trend,
                expected
            );
        }
        assert!(trend[3].trend > trend[0].trend, "slope must be positive");
    }

    #[test]
    fn test_trend_single_bucket_equals_count() {
        let cases = vec![case("1", "Lima", "2024-01"), case("2", "Lima", "2024-01")];
        let trend = monthly_trend(&cases);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].trend, 2.0);
    }

    #[test]
    fn test_trend_never_negative() {
        // Sharply decreasing counts push the fitted line below zero at the
        // tail; points clamp at 0.
        let mut cases = Vec::new();
        let mut id = 0;
        for (month, count) in [(1, 9), (2, 4), (3, 1), (4, 1)] {
            for _ in 0..count {
                id += 1;
                cases.push(case(&id.to_string(), "Lima", &format!("2024-{month}")));
            }
        }
        for point in monthly_trend(&cases) {
            assert!(point.trend >= 0.0);
        }
    }

    #[test]
    fn test_average_duration() {
        let now = YearMonth::new(2024, 7);
        let mut a = case("1", "Lima", "2024/01"); // 6 months
        let mut b = case("2", "Lima", "2024/04"); // 3 months
        a.status = CaseStatus::Active;
        b.status = CaseStatus::Active;
        assert_eq!(average_duration_at(&[a.clone(), b.clone()], now), 4.5);

        // Indeterminate durations are excluded, not counted as zero.
        let mut c = case("3", "Lima", "2024/01");
        c.status = CaseStatus::Discharged;
        c.discharge_date = None;
        assert_eq!(average_duration_at(&[a, b, c], now), 4.5);
    }

    #[test]
    fn test_average_duration_empty() {
        assert_eq!(average_duration_at(&[], YearMonth::new(2024, 7)), 0.0);
    }
}
