//! End-to-end scenarios for the case engine.
//!
//! These exercise the full pipeline the dashboard views use:
//! normalization → duration → filtering → aggregation → reports.

use oncotrack_core::aggregate;
use oncotrack_core::dates::{self, YearMonth};
use oncotrack_core::filter::{filter_cases, FilterCriteria};
use oncotrack_core::models::{CaseStatus, PatientCase, Sector};
use oncotrack_core::report::CaseListingReport;

fn base_case(id: &str) -> PatientCase {
    PatientCase {
        id: id.into(),
        coordinator: "Ana Torres".into(),
        city: "Lima".into(),
        physician: "Dr. Soto".into(),
        insurer: "Rimac".into(),
        sector: Sector::Private,
        institution: "Clinica Delgado".into(),
        dispensing_point: "Farmacia Central".into(),
        distributor: "Quimica Suiza".into(),
        indication: "QSDB03".into(),
        dosage: "200mg".into(),
        enrollment_date: "2024-01".into(),
        discharge_date: None,
        status: CaseStatus::Active,
    }
}

#[test]
fn test_active_case_duration_grows_with_now() {
    let mut c = base_case("1");
    c.enrollment_date = "2023-5".into();

    assert_eq!(c.normalized_enrollment().as_deref(), Some("2023/05"));
    assert_eq!(c.duration_months_at(YearMonth::new(2024, 8)), Some(15));
    // A later "now" yields a larger duration with no write to the case.
    assert_eq!(c.duration_months_at(YearMonth::new(2024, 12)), Some(19));
}

#[test]
fn test_same_month_discharge_is_zero_and_stays_in_range() {
    let mut c = base_case("1");
    c.enrollment_date = "2022/01".into();
    c.discharge_date = Some("2022/01".into());
    c.status = CaseStatus::Discharged;

    assert_eq!(c.duration_months_at(YearMonth::new(2024, 8)), Some(0));

    let criteria = FilterCriteria {
        date_range_start: Some("2022/01".into()),
        date_range_end: Some("2022/01".into()),
        ..Default::default()
    };
    let filtered = filter_cases(&[c], &criteria);
    assert_eq!(filtered.len(), 1, "zero-duration case must not be dropped");
}

#[test]
fn test_dashboard_pipeline_over_mixed_quality_data() {
    let now = YearMonth::new(2024, 8);

    let mut cases = Vec::new();
    for (id, enrollment, city) in [
        ("1", "2024-1", "Lima"),
        ("2", "2024/02", "Lima"),
        ("3", "2024-02-15T09:00:00Z", "Cusco"),
        ("4", "not a date", "Cusco"),
    ] {
        let mut c = base_case(id);
        c.enrollment_date = enrollment.into();
        c.city = city.into();
        cases.push(c);
    }

    // Date-bounded view: the unparseable enrollment is suppressed.
    let criteria = FilterCriteria {
        date_range_start: Some("2024/01".into()),
        date_range_end: Some("2024/12".into()),
        ..Default::default()
    };
    let filtered = filter_cases(&cases, &criteria);
    assert_eq!(filtered.len(), 3);

    // Trend buckets from the filtered view.
    let trend = aggregate::monthly_trend(&filtered);
    let buckets: Vec<&str> = trend.iter().map(|p| p.bucket.as_str()).collect();
    assert_eq!(buckets, vec!["2024/01", "2024/02"]);
    assert_eq!(trend[1].count, 2);

    // Unbounded view keeps the garbage row, shown as-is.
    let all = filter_cases(&cases, &FilterCriteria::default());
    assert_eq!(all.len(), 4);
    assert_eq!(
        dates::normalize_for_display(Some(&all[3].enrollment_date)),
        "not a date"
    );

    // Average duration over the filtered view: 7 + 6 + 6 months.
    assert!((aggregate::average_duration_at(&filtered, now) - 6.3).abs() < 1e-9);
}

#[test]
fn test_top_attribute_tie_keeps_input_order() {
    let mut cases = Vec::new();
    for (id, coordinator) in [("1", "Zoe"), ("2", "Ana"), ("3", "Zoe"), ("4", "Ana"), ("5", "Mia")]
    {
        let mut c = base_case(id);
        c.coordinator = coordinator.into();
        cases.push(c);
    }
    let top = aggregate::top_by_attribute(&cases, aggregate::CaseAttribute::Coordinator, 5);
    // Zoe and Ana tie at 2; Zoe appeared first.
    assert_eq!(top[0].value, "Zoe");
    assert_eq!(top[1].value, "Ana");
    assert_eq!(top[2].value, "Mia");
}

#[test]
fn test_followup_report_reflects_engine_outputs() {
    let now = YearMonth::new(2024, 8);

    let mut active = base_case("1");
    active.enrollment_date = "2023-5".into();

    let mut discharged = base_case("2");
    discharged.enrollment_date = "2024-02".into();
    discharged.discharge_date = Some("2024-06".into());
    discharged.status = CaseStatus::Discharged;

    let mut indeterminate = base_case("3");
    indeterminate.status = CaseStatus::Discharged;
    indeterminate.discharge_date = None;

    let report = CaseListingReport::followup_at(&[active, discharged, indeterminate], now);
    assert_eq!(report.record_count, 3);
    assert_eq!(report.rows[0].months, Some(15));
    assert_eq!(report.rows[1].months, Some(4));
    assert_eq!(report.rows[2].months, None);
}

#[test]
fn test_filter_then_aggregate_matches_manual_count() {
    let mut cases = Vec::new();
    for i in 0..20 {
        let mut c = base_case(&i.to_string());
        c.sector = if i % 2 == 0 {
            Sector::Public
        } else {
            Sector::Private
        };
        c.status = if i % 4 == 0 {
            CaseStatus::Discharged
        } else {
            CaseStatus::Active
        };
        if c.status == CaseStatus::Discharged {
            c.discharge_date = Some("2024-05".into());
        }
        cases.push(c);
    }

    let criteria = FilterCriteria {
        sector: Some(Sector::Public),
        status: Some(CaseStatus::Active),
        ..Default::default()
    };
    let filtered = filter_cases(&cases, &criteria);
    let expected = cases
        .iter()
        .filter(|c| c.sector == Sector::Public && c.status == CaseStatus::Active)
        .count();
    assert_eq!(filtered.len(), expected);

    let by_status = aggregate::group_by_status(&filtered);
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].value, "ACTIVE");
    assert_eq!(by_status[0].count, expected);
}
