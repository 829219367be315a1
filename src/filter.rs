use tracing::debug;

use crate::error::QueryError;
use crate::models::{Column, FilterCriteria, Record, RecordTable};
use crate::store;

impl FilterCriteria {
    /// The reset selection: every college, every status, the full year span.
    pub fn all(table: &RecordTable) -> Result<Self, QueryError> {
        let colleges = store::distinct_values(table, Column::College)?;
        let statuses = store::distinct_values(table, Column::PublishedStatus)?;
        let years = store::year_bounds(table)?;
        FilterCriteria::new(colleges, statuses, years.min, years.max)
    }

    fn matches(&self, record: &Record) -> bool {
        self.colleges().contains(&record.college)
            && self.statuses().contains(&record.published_status)
            && self.year_range().contains(record.year)
    }
}

/// Rows matching every criterion, in original order.
pub fn filter(table: &RecordTable, criteria: &FilterCriteria) -> RecordTable {
    let records: Vec<Record> = table
        .records()
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect();

    debug!(
        colleges = ?criteria.colleges(),
        statuses = ?criteria.statuses(),
        years = ?criteria.year_range(),
        kept = records.len(),
        total = table.len(),
        "filtered publications"
    );
    table.with_records(records)
}

/// Rows whose `column` equals `value`, or the complement when `invert` is set.
/// Null cells never equal anything.
pub fn filter_equals(
    table: &RecordTable,
    column: Column,
    value: &str,
    invert: bool,
) -> Result<RecordTable, QueryError> {
    select(table, column, invert, |cell| cell == value)
}

/// Rows whose `column` is one of `values`, or the complement when `invert` is set.
pub fn filter_in(
    table: &RecordTable,
    column: Column,
    values: &[&str],
    invert: bool,
) -> Result<RecordTable, QueryError> {
    select(table, column, invert, |cell| values.contains(&cell))
}

fn select<F>(
    table: &RecordTable,
    column: Column,
    invert: bool,
    predicate: F,
) -> Result<RecordTable, QueryError>
where
    F: Fn(&str) -> bool,
{
    table.require(column)?;
    let records = table
        .records()
        .iter()
        .filter(|record| {
            let hit = record
                .value(column)
                .map(|cell| predicate(&cell))
                .unwrap_or(false);
            hit != invert
        })
        .cloned()
        .collect();
    Ok(table.with_records(records))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::aggregate::STATUSES;
    use crate::fixtures;

    fn titles(table: &RecordTable) -> Vec<&str> {
        table.records().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn example_scenario_keeps_all_rows() {
        let table = fixtures::table(fixtures::CORE_ONLY_CSV);
        let criteria =
            fixtures::criteria(&["CAS", "CCIS"], &["PUBLISHED", "ACCEPTED"], 2020, 2021);
        let filtered = filter(&table, &criteria);
        assert_eq!(titles(&filtered), vec!["A", "B", "C"]);
    }

    #[test]
    fn predicates_are_conjunctive_and_order_preserving() {
        let table = fixtures::table(fixtures::FULL_CSV);
        let criteria = fixtures::criteria(&["CAS", "CCIS"], &["PUBLISHED", "ACCEPTED"], 2020, 2021);
        let filtered = filter(&table, &criteria);
        assert_eq!(titles(&filtered), vec!["P1", "P2", "P3"]);

        let criteria = fixtures::criteria(&["CAS"], &STATUSES, 2021, 2022);
        assert_eq!(titles(&filter(&table, &criteria)), vec!["P2", "P4", "P7"]);
    }

    #[test]
    fn empty_selection_sets_select_nothing() {
        let table = fixtures::table(fixtures::FULL_CSV);
        let no_colleges = fixtures::criteria(&[], &STATUSES, 2000, 2030);
        assert!(filter(&table, &no_colleges).is_empty());

        let no_statuses = fixtures::criteria(&["CAS", "CCIS", "MITL"], &[], 2000, 2030);
        assert!(filter(&table, &no_statuses).is_empty());
    }

    #[test]
    fn reset_criteria_select_everything() {
        let table = fixtures::table(fixtures::FULL_CSV);
        let criteria = FilterCriteria::all(&table).unwrap();
        assert_eq!(criteria.colleges().len(), 3);
        assert_eq!(criteria.statuses().len(), 5);
        assert_eq!(criteria.year_range().min, 2019);
        assert_eq!(criteria.year_range().max, 2022);
        assert_eq!(filter(&table, &criteria), table);

        let empty = fixtures::table(fixtures::HEADER_ONLY_CSV);
        assert!(FilterCriteria::all(&empty).is_err());
    }

    #[test]
    fn filter_equals_and_in_support_inversion() {
        let table = fixtures::table(fixtures::FULL_CSV);
        let scopus = filter_equals(&table, Column::ScopusClassification, "Scopus", false).unwrap();
        assert_eq!(titles(&scopus), vec!["P1", "P3", "P4", "P7"]);

        let ongoing = filter_in(
            &table,
            Column::PublishedStatus,
            &["PUBLISHED", "ACCEPTED"],
            true,
        )
        .unwrap();
        assert_eq!(titles(&ongoing), vec!["P4", "P5", "P6"]);

        let by_year = filter_equals(&table, Column::Year, "2020", false).unwrap();
        assert_eq!(titles(&by_year), vec!["P1", "P3"]);
    }

    #[test]
    fn null_cells_fall_on_the_inverted_side() {
        let table = fixtures::table(fixtures::FULL_CSV);
        let tagged = filter_equals(&table, Column::SdgTargeted, "SDG 4", false).unwrap();
        assert_eq!(titles(&tagged), vec!["P2"]);
        let rest = filter_equals(&table, Column::SdgTargeted, "SDG 4", true).unwrap();
        assert!(titles(&rest).contains(&"P6"));
        assert_eq!(tagged.len() + rest.len(), table.len());
    }

    #[test]
    fn absent_column_is_an_error_not_an_empty_result() {
        let table = fixtures::table(fixtures::CORE_ONLY_CSV);
        assert_eq!(
            filter_equals(&table, Column::Country, "Philippines", false),
            Err(QueryError::ColumnNotFound("Country".to_string()))
        );
        assert!(filter_in(&table, Column::Authors, &["Santos"], true).is_err());
    }

    fn column_strategy() -> impl Strategy<Value = Column> {
        prop::sample::select(vec![
            Column::Title,
            Column::College,
            Column::ProgramCluster,
            Column::Year,
            Column::PublishedStatus,
            Column::ScopusClassification,
            Column::PublicationFormat,
            Column::Authors,
            Column::SdgTargeted,
        ])
    }

    proptest! {
        /// Equality and its inversion split the table into disjoint halves.
        #[test]
        fn filter_equals_partitions_the_table(
            column in column_strategy(),
            value in prop::sample::select(vec!["CAS", "Scopus", "2021", "Santos", "P3", "SDG 4", ""]),
        ) {
            let table = fixtures::table(fixtures::FULL_CSV);
            let hit = filter_equals(&table, column, value, false).unwrap();
            let miss = filter_equals(&table, column, value, true).unwrap();

            prop_assert_eq!(hit.len() + miss.len(), table.len());
            for record in hit.records() {
                prop_assert!(!miss.records().contains(record));
            }
            for record in table.records() {
                prop_assert!(hit.records().contains(record) || miss.records().contains(record));
            }
        }

        /// Every kept row satisfies all three predicates.
        #[test]
        fn filter_respects_every_predicate(
            colleges in prop::sample::subsequence(vec!["CAS", "CCIS", "MITL"], 0..=3),
            statuses in prop::sample::subsequence(STATUSES.to_vec(), 0..=5),
            min in 2018i32..2023,
            span in 0i32..4,
        ) {
            let table = fixtures::table(fixtures::FULL_CSV);
            let criteria = fixtures::criteria(&colleges, &statuses, min, min + span);
            let filtered = filter(&table, &criteria);
            for record in filtered.records() {
                prop_assert!(colleges.contains(&record.college.as_str()));
                prop_assert!(statuses.contains(&record.published_status.as_str()));
                prop_assert!(record.year >= min && record.year <= min + span);
            }
            let expected = table
                .records()
                .iter()
                .filter(|r| {
                    colleges.contains(&r.college.as_str())
                        && statuses.contains(&r.published_status.as_str())
                        && (min..=min + span).contains(&r.year)
                })
                .count();
            prop_assert_eq!(filtered.len(), expected);
        }
    }
}
