use std::collections::{BTreeMap, BTreeSet};

use formats::Record;

/// Records grouped by scenario, then by year.
///
/// Built once after a load; immutable afterwards. Within a bucket records
/// keep source order. Scenario and year iteration is sorted so listings are
/// stable across runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScenarioYearIndex {
    buckets: BTreeMap<String, BTreeMap<i32, Vec<Record>>>,
    years: Vec<i32>,
    len: usize,
}

impl ScenarioYearIndex {
    /// Groups `records` in a single pass and derives the sorted year axis.
    pub fn build(records: impl IntoIterator<Item = Record>) -> Self {
        let mut buckets: BTreeMap<String, BTreeMap<i32, Vec<Record>>> = BTreeMap::new();
        let mut years = BTreeSet::new();
        let mut len = 0;

        for record in records {
            years.insert(record.year);
            let by_year = match buckets.get_mut(record.scenario.as_str()) {
                Some(by_year) => by_year,
                None => buckets.entry(record.scenario.clone()).or_default(),
            };
            by_year.entry(record.year).or_default().push(record);
            len += 1;
        }

        Self {
            buckets,
            years: years.into_iter().collect(),
            len,
        }
    }

    /// Records for one `(scenario, year)` pair; empty when the pair has no data.
    pub fn lookup(&self, scenario: &str, year: i32) -> &[Record] {
        self.buckets
            .get(scenario)
            .and_then(|by_year| by_year.get(&year))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct years, strictly increasing.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn scenario_names(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }

    pub fn has_scenario(&self, scenario: &str) -> bool {
        self.buckets.contains_key(scenario)
    }

    /// Position of `year` on the year axis.
    pub fn year_position(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every bucket as `(scenario, year, records)`.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, i32, &[Record])> {
        self.buckets.iter().flat_map(|(scenario, by_year)| {
            by_year
                .iter()
                .map(move |(year, records)| (scenario.as_str(), *year, records.as_slice()))
        })
    }

    /// Min and max finite value for one pair.
    pub fn value_range(&self, scenario: &str, year: i32) -> Option<(f64, f64)> {
        finite_values(self.lookup(scenario, year)).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Largest finite value across several pairs, e.g. both sides of a
    /// comparison frame.
    pub fn max_value<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, i32)>) -> Option<f64> {
        pairs
            .into_iter()
            .flat_map(|(scenario, year)| finite_values(self.lookup(scenario, year)))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }
}

fn finite_values(records: &[Record]) -> impl Iterator<Item = f64> + '_ {
    records.iter().map(|r| r.value).filter(|v| v.is_finite())
}
