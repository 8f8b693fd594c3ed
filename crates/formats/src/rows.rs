use foundation::math::wrap_lon_deg;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Number of leading columns every data row must carry:
/// `year,lat,lon,value,scenario`.
pub const REQUIRED_FIELDS: usize = 5;

/// One gridded precipitation observation.
///
/// Longitude is normalized to `[-180, 180)` at parse time. Numeric fields
/// that did not parse are `NaN`; renderers skip such records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub year: i32,
    pub lat: f64,
    pub lon: f64,
    /// Precipitation rate (mm/day).
    pub value: f64,
    pub scenario: String,
}

impl Record {
    /// Coordinates and value are all finite.
    pub fn is_plottable(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.value.is_finite()
    }
}

/// Why a data line produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("expected 5 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("year {value:?} is not an integer")]
    BadYear { value: String },
    #[error("scenario is empty")]
    MissingScenario,
    #[error("{field} {value:?} is not a number")]
    NonNumeric { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the source text (the header is line 1).
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: SkipReason },
}

/// Result of a lenient parse.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedRows {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
    pub blank_lines: usize,
}

/// Parses `year,lat,lon,value,scenario` text, skipping what cannot be used.
///
/// - The first line is always treated as a header.
/// - Blank lines are ignored.
/// - Rows with fewer than five fields, an unparseable year, or an empty
///   scenario are dropped and reported in [`ParsedRows::skipped`].
/// - Unparseable lat/lon/value become `NaN` and the row is kept.
///
/// Year and scenario are the index keys, so they are not given the `NaN`
/// treatment: a row without a usable key could never be looked up and is
/// dropped instead (`bad_year_and_empty_scenario_are_skipped`).
pub fn parse_records(text: &str) -> ParsedRows {
    let mut out = ParsedRows::default();

    for (idx, raw) in text.lines().enumerate().skip(1) {
        let line = idx + 1;
        match parse_row(raw) {
            Ok(Some(record)) => out.records.push(record),
            Ok(None) => out.blank_lines += 1,
            Err(reason) => {
                debug!(line, %reason, "skipping malformed row");
                out.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    info!(
        records = out.records.len(),
        skipped = out.skipped.len(),
        "parsed rows"
    );
    out
}

/// Like [`parse_records`] but fails on the first malformed row, including rows
/// whose coordinates or value are not numbers.
pub fn parse_records_strict(text: &str) -> Result<Vec<Record>, FormatError> {
    let mut records = Vec::new();

    for (idx, raw) in text.lines().enumerate().skip(1) {
        let line = idx + 1;
        let record = match parse_row(raw) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(reason) => return Err(FormatError::MalformedRow { line, reason }),
        };
        if let Some(reason) = non_numeric_field(raw, &record) {
            return Err(FormatError::MalformedRow { line, reason });
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_row(raw: &str) -> Result<Option<Record>, SkipReason> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() < REQUIRED_FIELDS {
        return Err(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }

    let year = parse_year(fields[0]).ok_or_else(|| SkipReason::BadYear {
        value: fields[0].trim().to_string(),
    })?;
    let scenario = fields[4].trim();
    if scenario.is_empty() {
        return Err(SkipReason::MissingScenario);
    }

    Ok(Some(Record {
        year,
        lat: parse_number(fields[1]),
        lon: wrap_lon_deg(parse_number(fields[2])),
        value: parse_number(fields[3]),
        scenario: scenario.to_string(),
    }))
}

/// Integers, or integral floats such as `2020.0`.
fn parse_year(field: &str) -> Option<i32> {
    let s = field.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_number(field: &str) -> f64 {
    field.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn non_numeric_field(raw: &str, record: &Record) -> Option<SkipReason> {
    let fields: Vec<&str> = raw.split(',').collect();
    let checks = [
        ("lat", record.lat, 1),
        ("lon", record.lon, 2),
        ("value", record.value, 3),
    ];
    checks
        .into_iter()
        .find(|(_, v, _)| !v.is_finite())
        .map(|(field, _, col)| SkipReason::NonNumeric {
            field,
            value: fields[col].trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{FormatError, SkipReason, SkippedRow, parse_records, parse_records_strict};
    use pretty_assertions::assert_eq;

    const HEADER: &str = "year,lat,lon,pr_mm_day,scenario";

    #[test]
    fn parses_example_rows_in_order() {
        let text = "year,lat,lon,pr_mm_day,scenario\n2020,10,20,0.5,ssp126\n2020,10,20,0.8,ssp245\n";
        let parsed = parse_records(text);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].scenario, "ssp126");
        assert_eq!(parsed.records[0].value, 0.5);
        assert_eq!(parsed.records[1].scenario, "ssp245");
        assert_eq!(parsed.records[1].value, 0.8);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn m_well_formed_rows_yield_m_records() {
        let mut text = String::from(HEADER);
        for i in 0..37 {
            text.push_str(&format!("\n{},{},{},{},ssp245", 2015 + i % 5, i, -i, i as f64 * 0.1));
        }
        let parsed = parse_records(&text);
        assert_eq!(parsed.records.len(), 37);
        for (i, r) in parsed.records.iter().enumerate() {
            assert_eq!(r.lat, i as f64);
        }
    }

    #[test]
    fn header_is_never_data() {
        let parsed = parse_records("2020,1,2,3,ssp126\n2021,1,2,3,ssp126");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].year, 2021);
    }

    #[test]
    fn blank_line_yields_one_fewer_record() {
        let text = format!("{HEADER}\n2020,1,1,1,a\n   \n2020,2,2,2,a\n2020,3,3,3,a");
        let parsed = parse_records(&text);
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.blank_lines, 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn short_row_dropped_without_affecting_neighbours() {
        let text = format!("{HEADER}\n2020,1,1,0.1,a\n2020,2,2\n2020,3,3,0.3,b");
        let parsed = parse_records(&text);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].value, 0.1);
        assert_eq!(parsed.records[0].scenario, "a");
        assert_eq!(parsed.records[1].value, 0.3);
        assert_eq!(parsed.records[1].scenario, "b");
        assert_eq!(
            parsed.skipped,
            vec![SkippedRow {
                line: 3,
                reason: SkipReason::TooFewFields { found: 3 }
            }]
        );
    }

    #[test]
    fn bad_numbers_become_nan_and_parsing_continues() {
        let text = format!("{HEADER}\n2020,north,1,abc,a\n2020,5,5,0.5,a");
        let parsed = parse_records(&text);
        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.records[0].lat.is_nan());
        assert!(parsed.records[0].value.is_nan());
        assert!(!parsed.records[0].is_plottable());
        assert!(parsed.records[1].is_plottable());
    }

    #[test]
    fn bad_year_and_empty_scenario_are_skipped() {
        let text = format!("{HEADER}\nsoon,1,1,1,a\n2020,1,1,1,  \n2020.0,1,1,1,a");
        let parsed = parse_records(&text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].year, 2020);
        assert_eq!(
            parsed.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: SkipReason::BadYear {
                        value: "soon".to_string()
                    }
                },
                SkippedRow {
                    line: 3,
                    reason: SkipReason::MissingScenario
                },
            ]
        );
    }

    #[test]
    fn trims_tokens_and_crlf() {
        let text = "h\r\n 2030 , 10.5 , 200 , 0.7 ,  ssp585 \r\n";
        let parsed = parse_records(text);
        assert_eq!(parsed.records.len(), 1);
        let r = &parsed.records[0];
        assert_eq!(r.year, 2030);
        assert_eq!(r.lat, 10.5);
        assert_eq!(r.lon, -160.0);
        assert_eq!(r.scenario, "ssp585");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let parsed = parse_records("h\n2020,1,2,3,ssp126,extra,cols");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].scenario, "ssp126");
    }

    #[test]
    fn empty_and_header_only_inputs() {
        assert!(parse_records("").records.is_empty());
        assert!(parse_records(HEADER).records.is_empty());
    }

    #[test]
    fn strict_mode_reports_first_bad_row() {
        let text = format!("{HEADER}\n2020,1,1,1,a\n\n2020,1,x,1,a\n2020,1");
        let err = parse_records_strict(&text).expect_err("strict");
        match err {
            FormatError::MalformedRow { line, reason } => {
                assert_eq!(line, 4);
                assert_eq!(
                    reason,
                    SkipReason::NonNumeric {
                        field: "lon",
                        value: "x".to_string()
                    }
                );
            }
        }
    }

    #[test]
    fn strict_mode_accepts_clean_input() {
        let text = format!("{HEADER}\n2020,1,1,1,a\n\n2025,2,2,2,b\n");
        let records = parse_records_strict(&text).expect("clean");
        assert_eq!(records.len(), 2);
    }
}
