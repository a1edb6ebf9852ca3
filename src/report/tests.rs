use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::model::SuiteMapping;
use crate::output::OutputValue;
use crate::sheet::Cell;

use super::calendar::{days_in_month, is_leap_year};
use super::extract::EndPolicy;
use super::markers::{FREEFORM_SENTINEL, find_labeled_block, find_last_containing};
use super::period::is_full_period;
use super::reshape::{GroupValue, LongRecord, WideTable, melt, pivot};
use super::schema::{DuplicatePolicy, SplitRule};

fn text(value: &str) -> Cell {
    Cell::text(value)
}

fn num(value: f64) -> Cell {
    Cell::Number(value)
}

fn stamp(year: i32, month: u32, day: u32) -> Cell {
    Cell::DateTime(date(year, month, day).and_hms_opt(0, 0, 0).expect("valid time"))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn compact(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%m%d%Y").expect("valid compact date")
}

fn column(table: &OutputTable, name: &str) -> Vec<OutputValue> {
    let index = table
        .columns
        .iter()
        .position(|column| column == name)
        .expect("column should exist");
    table.rows.iter().map(|row| row[index].clone()).collect()
}

fn header_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![text("# Report suite: www.sotyktu.com_US_US")],
        vec![text("# Date: Jan 1, 2024 - Jan 31, 2024")],
        vec![],
    ]
}

fn indication_sheet() -> RawSheet {
    let mut rows = header_rows();
    rows.extend([
        vec![text(FREEFORM_SENTINEL)],
        vec![text("# Freeform table")],
        vec![text(FREEFORM_SENTINEL)],
        vec![text("Indication"), text("Visits"), Cell::Empty, text("Unbounced visit"), Cell::Empty],
        vec![Cell::Empty, text("Direct"), text("Paid Search"), text("Direct"), text("Paid Search")],
        vec![Cell::Empty, num(300.0), num(200.0), num(150.0), num(100.0)],
        vec![text("Psoriasis"), num(120.0), num(80.0), num(60.0), num(40.0)],
    ]);
    RawSheet::new(rows)
}

fn scroll_block() -> RawSheet {
    RawSheet::new(vec![
        vec![
            text("Page"),
            text("Page Views"),
            text("Page Views"),
            text("Page Scroll 25%"),
            text("Page Scroll 25%"),
            text("Total"),
        ],
        vec![
            Cell::Empty,
            stamp(2024, 1, 1),
            stamp(2024, 2, 1),
            stamp(2024, 1, 1),
            stamp(2024, 2, 1),
            text("All"),
        ],
        vec![Cell::Empty, num(37.0), num(24.0), num(6.0), num(2.0), num(69.0)],
        vec![text("/home"), num(10.0), num(20.0), num(5.0), Cell::Empty, num(35.0)],
        vec![text("/about"), num(3.0), num(4.0), num(1.0), num(2.0), num(10.0)],
    ])
}

fn header() -> ReportHeader {
    ReportHeader {
        identity: SuiteRegistry::builtin()
            .resolve("www.sotyktu.com_US_US")
            .expect("sotyktu is mapped"),
        range: DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).expect("ordered range"),
    }
}

#[test]
fn leap_years_follow_gregorian_century_rule() {
    assert!(!is_leap_year(1900));
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(2023));
}

#[test]
fn days_in_month_handles_february_and_short_months() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2100, 2), 28);
    assert_eq!(days_in_month(2024, 4), 30);
    assert_eq!(days_in_month(2024, 12), 31);
    assert_eq!(days_in_month(2024, 13), 0);
}

#[test]
fn full_period_accepts_whole_months_and_years() {
    assert!(is_full_period(compact("01012024"), compact("01312024")));
    assert!(is_full_period(compact("01012024"), compact("12312024")));
    assert!(is_full_period(compact("03012024"), compact("05312024")));
    assert!(is_full_period(compact("02012024"), compact("02292024")));
    assert!(is_full_period(compact("12012023"), compact("01312024")));
    assert!(is_full_period(compact("01012023"), compact("12312024")));
}

#[test]
fn full_period_rejects_ranges_ending_mid_month() {
    assert!(!is_full_period(compact("01012024"), compact("01152024")));
    assert!(!is_full_period(compact("02012023"), compact("02272023")));
    assert!(!is_full_period(compact("01012024"), compact("03302024")));
    assert!(!is_full_period(compact("01012024"), compact("01012024")));
}

#[test]
fn full_period_accepts_cross_year_span_of_a_full_year_length() {
    assert!(is_full_period(compact("03152023"), compact("03142024")));
    assert!(is_full_period(compact("01022023"), compact("01012024")));
    assert!(!is_full_period(compact("06152023"), compact("01102024")));
}

#[test]
fn month_walk_accepts_a_mid_month_start_that_ends_on_a_month_end() {
    assert!(is_full_period(compact("01152024"), compact("02292024")));
    assert!(is_full_period(compact("01022024"), compact("12312024")));
}

#[test]
fn date_marker_parses_into_compact_range() {
    let range = DateRange::parse_marker("Jan 1, 2024 - Jan 31, 2024").expect("marker should parse");
    assert_eq!(range.start(), date(2024, 1, 1));
    assert_eq!(range.end(), date(2024, 1, 31));
    assert_eq!(range.compact(), "01012024-01312024");
    assert_eq!(range.to_string(), "01012024-01312024");
}

#[test]
fn date_marker_rejects_single_day_and_garbage() {
    for text in ["Jan 1, 2024", "January-ish 2024 - later", "Feb 30, 2024 - Mar 31, 2024"] {
        let err = DateRange::parse_marker(text).expect_err("marker should be rejected");
        assert!(matches!(err, ReportError::DateFormat { .. }), "{text}: {err}");
    }
}

#[test]
fn date_range_rejects_start_after_end() {
    let err = DateRange::parse_marker("Mar 1, 2024 - Jan 31, 2024").expect_err("reversed range");
    assert!(matches!(err, ReportError::DateFormat { .. }));
}

#[test]
fn prefix_marker_returns_trimmed_remainder() {
    let sheet = indication_sheet();
    let (row, suite) = locate_prefixed(&sheet, REPORT_SUITE_PREFIX).expect("suite marker");
    assert_eq!(row, 0);
    assert_eq!(suite, "www.sotyktu.com_US_US");

    let empty = RawSheet::new(vec![vec![text("nothing here")]]);
    let err = locate_prefixed(&empty, DATE_PREFIX).expect_err("no date marker");
    assert!(matches!(err, ReportError::MarkerNotFound { .. }));
}

#[test]
fn sentinel_search_picks_last_occurrence() {
    let sheet = indication_sheet();
    assert_eq!(find_last_containing(&sheet, FREEFORM_SENTINEL), Some(5));
    assert_eq!(locate_last_sentinel(&sheet).expect("sentinel"), 5);

    let bare = RawSheet::new(vec![vec![text("# Freeform table")]]);
    assert!(matches!(
        locate_last_sentinel(&bare),
        Err(ReportError::MarkerNotFound { .. })
    ));
}

#[test]
fn labeled_block_matches_with_or_without_spaces() {
    let spaced = RawSheet::new(vec![vec![], vec![text("# Freeform table")]]);
    assert_eq!(find_labeled_block(&spaced, "Freeform table"), Some(3));

    let compact = RawSheet::new(vec![vec![text("# Freeformtable (2)")]]);
    assert_eq!(find_labeled_block(&compact, "Freeform table"), Some(2));

    let missing = RawSheet::new(vec![vec![text("# Other table")]]);
    assert!(matches!(
        locate_labeled_block(&missing, "Freeform table"),
        Err(ReportError::MarkerNotFound { .. })
    ));
}

#[test]
fn extract_block_stops_before_first_blank_row() {
    let sheet = RawSheet::new(vec![
        vec![text("a")],
        vec![text("b"), num(1.0)],
        vec![Cell::Empty, Cell::Empty],
        vec![text("c")],
    ]);

    let block = extract_block(&sheet, 0, EndPolicy::BlankRow, "MONTHLY").expect("block");
    assert_eq!(block.len(), 2);
    assert_eq!(block.cell(1, 1), &num(1.0));

    let tail = extract_block(&sheet, 1, EndPolicy::EndOfSheet, "MONTHLY").expect("tail");
    assert_eq!(tail.len(), 3);
}

#[test]
fn extract_block_without_blank_row_is_malformed() {
    let sheet = RawSheet::new(vec![vec![text("a")], vec![text("b")]]);
    let err = extract_block(&sheet, 0, EndPolicy::BlankRow, "MONTHLY").expect_err("no blank row");
    assert_eq!(
        err,
        ReportError::MalformedTable {
            table: "MONTHLY".to_string(),
            start: 0
        }
    );
    assert!(err.is_table_local());
}

#[test]
fn wide_table_fills_merged_headers_and_drops_subtotal_row() {
    let block = RawSheet::new(indication_sheet().rows()[6..].to_vec());
    let wide = WideTable::from_block(&block, "INDICATION").expect("wide table");

    assert_eq!(wide.upper, vec!["Indication", "Visits", "Visits", "Unbounced visit", "Unbounced visit"]);
    assert_eq!(wide.rows.len(), 1);
    assert_eq!(wide.rows[0][0], text("Psoriasis"));

    let labels = wide.combine_labels("INDICATION", true);
    assert_eq!(
        labels,
        vec![
            "INDICATION",
            "Visits Direct",
            "Visits Paid Search",
            "Unbouncedvisit Direct",
            "Unbouncedvisit Paid Search",
        ]
    );
}

#[test]
fn melt_emits_one_record_per_value_cell_column_major() {
    let labels = vec!["KEY".to_string(), "a x".to_string(), "b y".to_string()];
    let rows = vec![
        vec![text("k1"), num(1.0), num(2.0)],
        vec![text("k2"), Cell::Empty, text("4")],
    ];

    let melted = melt(&labels, &rows, &[1, 2]);
    let summary: Vec<(&str, &str, Option<f64>)> = melted
        .iter()
        .map(|record| (record.key.as_str(), record.label.as_str(), record.value))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("k1", "a x", Some(1.0)),
            ("k2", "a x", None),
            ("k1", "b y", Some(2.0)),
            ("k2", "b y", Some(4.0)),
        ]
    );
}

#[test]
fn split_label_follows_table_rule() {
    let engine = ReshapeEngine::new().expect("engine");

    assert_eq!(
        engine.split_label("Unbouncedvisit Paid Search", SplitRule::MetricFirst),
        Some((
            "Unbouncedvisit".to_string(),
            GroupValue::Label("Paid Search".to_string())
        ))
    );
    assert_eq!(
        engine.split_label("Unique Visitors 2024-03-01 00:00:00", SplitRule::DateStamped),
        Some(("Unique".to_string(), GroupValue::Period(date(2024, 3, 1))))
    );
    assert_eq!(engine.split_label("Total All", SplitRule::DateStamped), None);
}

#[test]
fn melt_then_pivot_preserves_every_value() {
    let engine = ReshapeEngine::new().expect("engine");
    let labels = vec![
        "KEY".to_string(),
        "Visits Direct".to_string(),
        "Visits Email".to_string(),
        "Bounce Direct".to_string(),
        "Bounce Email".to_string(),
    ];
    let rows = vec![
        vec![text("A"), num(1.0), num(2.0), num(0.25), num(0.5)],
        vec![text("B"), num(3.0), num(4.0), num(0.75), num(1.0)],
    ];

    let records: Vec<LongRecord> = melt(&labels, &rows, &[1, 2, 3, 4])
        .into_iter()
        .map(|melted| {
            let (metric, group) = engine
                .split_label(&melted.label, SplitRule::MetricFirst)
                .expect("label splits");
            LongRecord {
                key: melted.key,
                group,
                metric,
                value: melted.value,
            }
        })
        .collect();

    let pivoted = pivot(records, DuplicatePolicy::Reject, "TEST").expect("pivot");
    assert_eq!(pivoted.len(), 4);

    for (row_index, row) in rows.iter().enumerate() {
        let key = ["A", "B"][row_index];
        for (col, label) in labels.iter().enumerate().skip(1) {
            let (metric, channel) = label.split_once(' ').expect("label");
            let pivot_row = pivoted
                .iter()
                .find(|candidate| {
                    candidate.key == key && candidate.group == GroupValue::Label(channel.to_string())
                })
                .expect("pivot row exists");
            assert_eq!(pivot_row.metrics.get(metric).copied(), row[col].as_number());
        }
    }
}

#[test]
fn pivot_rejects_or_averages_duplicates_by_policy() {
    let record = |value: f64| LongRecord {
        key: "A".to_string(),
        group: GroupValue::Label("Direct".to_string()),
        metric: "Visits".to_string(),
        value: Some(value),
    };

    let err = pivot(vec![record(1.0), record(3.0)], DuplicatePolicy::Reject, "SCROLL")
        .expect_err("duplicates rejected");
    assert!(matches!(err, ReportError::DuplicateEntry { .. }));
    assert!(err.is_table_local());

    let averaged = pivot(vec![record(1.0), record(3.0)], DuplicatePolicy::Mean, "INDICATION")
        .expect("duplicates averaged");
    assert_eq!(averaged[0].metrics.get("Visits"), Some(&2.0));
}

#[test]
fn indication_table_is_reshaped_and_enriched() {
    let sheet = indication_sheet();
    let engine = ReshapeEngine::new().expect("engine");

    let table = process_table(&sheet, TableKind::Indication, &header(), &engine).expect("table");

    assert_eq!(
        table.columns,
        vec![
            "INDICATION",
            "CHANNEL",
            "VISITS",
            "UNBOUNCED VISIT",
            "BRAND",
            "ACTIVITY START MONTH",
            "ACTIVITY END MONTH",
        ]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.rows[0],
        vec![
            OutputValue::Text("Psoriasis".to_string()),
            OutputValue::Text("Direct".to_string()),
            OutputValue::Number(120.0),
            OutputValue::Number(60.0),
            OutputValue::Text("Sotyktu".to_string()),
            OutputValue::Date(date(2024, 1, 1)),
            OutputValue::Date(date(2024, 1, 31)),
        ]
    );
    assert_eq!(
        column(&table, "CHANNEL")[1],
        OutputValue::Text("Paid Search".to_string())
    );
}

#[test]
fn indication_channel_with_only_blank_cells_becomes_a_zero_row() {
    let mut rows = indication_sheet().rows().to_vec();
    rows.push(vec![text("Lupus"), num(5.0), Cell::Empty, num(2.0), Cell::Empty]);
    let engine = ReshapeEngine::new().expect("engine");

    let table = process_table(&RawSheet::new(rows), TableKind::Indication, &header(), &engine)
        .expect("table");

    assert_eq!(table.len(), 4);
    assert_eq!(
        table.rows[2][..4],
        [
            OutputValue::Text("Lupus".to_string()),
            OutputValue::Text("Paid Search".to_string()),
            OutputValue::Number(0.0),
            OutputValue::Number(0.0),
        ]
    );
    assert_eq!(table.rows[0][2], OutputValue::Number(5.0));
}

#[test]
fn scroll_table_sorts_by_page_then_month_and_fills_zeros() {
    let engine = ReshapeEngine::new().expect("engine");
    let table = engine
        .reshape(&scroll_block(), TableKind::Scroll.schema())
        .expect("scroll table");

    assert_eq!(
        table.columns,
        vec![
            "PAGE",
            "ACTIVITY MONTH",
            "PAGE VIEWS",
            "PAGE SCROLL 25",
            "PAGE SCROLL 50",
            "PAGE SCROLL 75",
            "PAGE SCROLL 100",
        ]
    );
    assert_eq!(
        column(&table, "PAGE"),
        ["/about", "/about", "/home", "/home"]
            .iter()
            .map(|page| OutputValue::Text(page.to_string()))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        column(&table, "ACTIVITY MONTH"),
        vec![
            OutputValue::Date(date(2024, 1, 1)),
            OutputValue::Date(date(2024, 2, 1)),
            OutputValue::Date(date(2024, 1, 1)),
            OutputValue::Date(date(2024, 2, 1)),
        ]
    );
    assert_eq!(
        column(&table, "PAGE VIEWS"),
        vec![
            OutputValue::Number(3.0),
            OutputValue::Number(4.0),
            OutputValue::Number(10.0),
            OutputValue::Number(20.0),
        ]
    );
    assert_eq!(column(&table, "PAGE SCROLL 25")[3], OutputValue::Number(0.0));
    assert!(
        column(&table, "PAGE SCROLL 100")
            .iter()
            .all(|value| *value == OutputValue::Number(0.0))
    );
}

#[test]
fn last_touch_table_keeps_first_word_of_metric_and_orders_month_first() {
    let block = RawSheet::new(vec![
        vec![
            text("Last Touch Channel"),
            text("Unique Visitors"),
            text("Bounce Rate"),
            text("Unique Visitors"),
        ],
        vec![
            Cell::Empty,
            stamp(2024, 2, 1),
            stamp(2024, 2, 1),
            text("2024-01-01 00:00:00"),
        ],
        vec![Cell::Empty, num(9.0), num(0.5), num(9.0)],
        vec![text("Organic"), num(5.0), num(0.4), num(4.0)],
    ]);
    let engine = ReshapeEngine::new().expect("engine");

    let table = engine
        .reshape(&block, TableKind::LastTouch.schema())
        .expect("last touch table");

    assert_eq!(&table.columns[..3], ["ACTIVITY MONTH", "LAST TOUCH CHANNEL", "UNIQUE VISITORS"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0][0], OutputValue::Date(date(2024, 1, 1)));
    assert_eq!(table.rows[0][2], OutputValue::Number(4.0));
    assert_eq!(table.rows[1][2], OutputValue::Number(5.0));
    assert_eq!(column(&table, "BOUNCE RATE"), vec![OutputValue::Number(0.0), OutputValue::Number(0.4)]);
}

#[test]
fn date_column_table_without_dates_is_skipped() {
    let block = RawSheet::new(vec![
        vec![text("Page"), text("Page Views")],
        vec![Cell::Empty, text("Total")],
        vec![Cell::Empty, num(1.0)],
        vec![text("/home"), num(1.0)],
    ]);
    let engine = ReshapeEngine::new().expect("engine");

    let err = engine
        .reshape(&block, TableKind::Scroll.schema())
        .expect_err("no date columns");
    assert_eq!(
        err,
        ReportError::NoDateColumns {
            table: "SCROLL".to_string()
        }
    );
    assert!(err.is_table_local());
}

#[test]
fn monthly_table_maps_columns_into_canonical_order() {
    let sheet = RawSheet::new(vec![
        vec![text(FREEFORM_SENTINEL)],
        vec![text("# Freeform table")],
        vec![text(FREEFORM_SENTINEL)],
        vec![text("Month"), text("Visits"), text("Unique Visitors"), text("Bounce Rate")],
        vec![Cell::Empty, num(30.0), num(20.0), num(0.5)],
        vec![stamp(2024, 1, 1), num(12.0), num(8.0), num(0.25)],
        vec![text("2024-02-01 00:00:00"), num(18.0), num(12.0), Cell::Empty],
        vec![],
        vec![text("# Freeform table (2)")],
    ]);
    let engine = ReshapeEngine::new().expect("engine");

    let table = process_table(&sheet, TableKind::Monthly, &header(), &engine).expect("monthly");

    assert_eq!(
        table.columns,
        vec![
            "ACTIVITY MONTH",
            "UNIQUE VISITORS",
            "VISITS",
            "UNBOUNCED VISIT",
            "BOUNCE RATE",
            "PAGE VIEWS PER VISITS",
            "AVERAGE TIME ON SITE",
            "BRAND",
            "INDICATION",
        ]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.rows[0][..5],
        [
            OutputValue::Date(date(2024, 1, 1)),
            OutputValue::Number(8.0),
            OutputValue::Number(12.0),
            OutputValue::Number(0.0),
            OutputValue::Number(0.25),
        ]
    );
    assert_eq!(table.rows[1][4], OutputValue::Number(0.0));
    assert_eq!(table.rows[1][8], OutputValue::Text("psoriasis".to_string()));
}

#[test]
fn monthly_row_label_that_is_not_a_date_is_rejected() {
    let block = RawSheet::new(vec![
        vec![text("Month"), text("Visits")],
        vec![Cell::Empty, num(1.0)],
        vec![text("Last quarter"), num(1.0)],
    ]);
    let engine = ReshapeEngine::new().expect("engine");

    let err = engine
        .reshape(&block, TableKind::Monthly.schema())
        .expect_err("label is not a date");
    assert!(matches!(err, ReportError::InvalidPeriod { .. }));
}

#[test]
fn read_header_resolves_identity_and_validates_period() {
    let registry = SuiteRegistry::builtin();
    let parsed = read_header(&indication_sheet(), &registry).expect("header");
    assert_eq!(parsed, header());

    let partial = RawSheet::new(vec![
        vec![text("# Report suite: www.opdivo.com_US_US")],
        vec![text("# Date: Jan 1, 2024 - Jan 15, 2024")],
    ]);
    let err = read_header(&partial, &registry).expect_err("partial month");
    assert_eq!(
        err,
        ReportError::PeriodInvalid {
            range: "01012024-01152024".to_string()
        }
    );
}

#[test]
fn read_header_rejects_unmapped_suite() {
    let sheet = RawSheet::new(vec![
        vec![text("# Report suite: www.unknown.com_US_US")],
        vec![text("# Date: Jan 1, 2024 - Jan 31, 2024")],
    ]);
    let err = read_header(&sheet, &SuiteRegistry::builtin()).expect_err("unmapped");
    assert_eq!(
        err,
        ReportError::UnmappedSuite {
            suite: "www.unknown.com_US_US".to_string()
        }
    );
    assert!(!err.is_table_local());
}

#[test]
fn builtin_registry_carries_every_known_suite() {
    let registry = SuiteRegistry::builtin();
    assert_eq!(registry.len(), 17);

    let camzyos = registry
        .resolve("www.hcmrealtalk.com_US_US")
        .expect("hcmrealtalk is mapped");
    assert_eq!(camzyos.brand, "Camzyos Non-branded");
    assert_eq!(camzyos.indication, "cross indication");
}

#[test]
fn suite_map_file_replaces_builtin_and_rejects_duplicates() {
    let raw = r#"
    {
      "suites": [
        { "suite": "www.example.com_US_US", "brand": "Example", "indication": "asthma" }
      ]
    }
    "#;
    let file: crate::model::SuiteMapFile = serde_json::from_str(raw).expect("suite map parses");
    let registry = SuiteRegistry::from_mappings(file.suites).expect("registry");
    assert_eq!(registry.len(), 1);
    assert!(registry.resolve("www.sotyktu.com_US_US").is_err());

    let mapping = SuiteMapping {
        suite: "www.example.com_US_US".to_string(),
        brand: "Example".to_string(),
        indication: "asthma".to_string(),
    };
    assert!(SuiteRegistry::from_mappings(vec![mapping.clone(), mapping]).is_err());
}

#[test]
fn date_time_cells_render_with_seconds() {
    let value = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
        .expect("datetime");
    assert_eq!(Cell::DateTime(value).render(), "2024-01-01 00:00:00");
    assert_eq!(num(25.0).render(), "25");
    assert_eq!(num(0.5).render(), "0.5");
}
