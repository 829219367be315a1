use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::error::QueryError;
use crate::filter;
use crate::models::{
    Aggregate, Column, CrossTab, CrossTabCell, GroupCount, NoDataReason, PivotTable, Ranking,
    Record, RecordTable, SeriesPoint, Share, SummaryCounts, TimeSeries,
};

pub const TOP_AUTHORS: usize = 10;

pub const SDG_TAGS: [&str; 17] = [
    "SDG 1", "SDG 2", "SDG 3", "SDG 4", "SDG 5", "SDG 6", "SDG 7", "SDG 8", "SDG 9", "SDG 10",
    "SDG 11", "SDG 12", "SDG 13", "SDG 14", "SDG 15", "SDG 16", "SDG 17",
];

pub const STATUSES: [&str; 5] = [
    "PUBLISHED",
    "ACCEPTED",
    "UNDER EVALUATION",
    "WAITING FOR PUBLICATION",
    "TO BE PRESENTED",
];

/// One selected college drills into its programs; otherwise colleges are compared.
pub fn dimension_for(selected_colleges: &BTreeSet<String>) -> (Column, String) {
    match single(selected_colleges) {
        Some(college) => (
            Column::ProgramCluster,
            format!("Number of Publications for {college}"),
        ),
        None => (
            Column::College,
            "Number of Publications per College".to_string(),
        ),
    }
}

/// Publication counts per year for each college, or each program of a single college.
pub fn timeline(
    filtered: &RecordTable,
    selected_colleges: &BTreeSet<String>,
) -> Aggregate<TimeSeries> {
    if filtered.is_empty() {
        return no_data("timeline", NoDataReason::EmptySelection);
    }
    let (dimension, title) = dimension_for(selected_colleges);

    let mut counts: BTreeMap<(String, i32), usize> = BTreeMap::new();
    for record in filtered.records() {
        let group = group_value(record, dimension);
        *counts.entry((group, record.year)).or_insert(0) += 1;
    }

    Aggregate::Data(TimeSeries {
        title,
        dimension,
        points: counts
            .into_iter()
            .map(|((group, year), count)| SeriesPoint { group, year, count })
            .collect(),
    })
}

/// Share of publications per college, or per program of a single college.
pub fn share(filtered: &RecordTable, selected_colleges: &BTreeSet<String>) -> Aggregate<Share> {
    if filtered.is_empty() {
        return no_data("share", NoDataReason::EmptySelection);
    }
    let (dimension, title) = dimension_for(selected_colleges);

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in filtered.records() {
        *counts.entry(group_value(record, dimension)).or_insert(0) += 1;
    }

    Aggregate::Data(Share {
        title,
        dimension,
        slices: into_group_counts(counts),
    })
}

/// Counts per (`key_a`, `key_b`) pair.
pub fn cross_tab(
    filtered: &RecordTable,
    key_a: Column,
    key_b: Column,
    title: &str,
) -> Aggregate<CrossTab> {
    for key in [key_a, key_b] {
        if !filtered.has_column(key) {
            return no_data("cross_tab", NoDataReason::MissingColumn(key));
        }
    }
    if filtered.is_empty() {
        return no_data("cross_tab", NoDataReason::EmptySelection);
    }

    let pairs = filtered.records().iter().filter_map(|record| {
        Some((
            record.value(key_a)?.into_owned(),
            record.value(key_b)?.into_owned(),
        ))
    });
    tabulate(pairs, key_a.header(), key_b.header(), title)
}

pub fn scopus_by_college(filtered: &RecordTable) -> Aggregate<CrossTab> {
    cross_tab(
        filtered,
        Column::ScopusClassification,
        Column::College,
        "Scopus vs. Non-Scopus per College",
    )
}

pub fn format_by_college(filtered: &RecordTable) -> Aggregate<CrossTab> {
    cross_tab(
        filtered,
        Column::PublicationFormat,
        Column::College,
        "Journal vs. Proceeding Research Papers per College",
    )
}

/// Classification and format folded into one label, e.g. "Scopus (Journal)", per college.
pub fn scopus_format_by_college(filtered: &RecordTable) -> Aggregate<CrossTab> {
    if filtered.is_empty() {
        return no_data("scopus_format", NoDataReason::EmptySelection);
    }

    let pairs = filtered.records().iter().map(|record| {
        (
            format!(
                "{} ({})",
                record.scopus_classification, record.publication_format
            ),
            record.college.clone(),
        )
    });
    tabulate(
        pairs,
        "Classification (Format)",
        Column::College.header(),
        "Scopus and Publication Format per College",
    )
}

/// The ten most frequent author strings, highest first. Ties keep first-seen order.
pub fn top_authors(filtered: &RecordTable) -> Aggregate<Ranking> {
    if !filtered.has_column(Column::Authors) {
        return no_data("top_authors", NoDataReason::MissingColumn(Column::Authors));
    }
    if filtered.is_empty() {
        return no_data("top_authors", NoDataReason::EmptySelection);
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<GroupCount> = Vec::new();
    for authors in filtered
        .records()
        .iter()
        .filter_map(|record| record.authors.as_deref())
    {
        match index.get(authors) {
            Some(&position) => entries[position].count += 1,
            None => {
                index.insert(authors, entries.len());
                entries.push(GroupCount {
                    label: authors.to_string(),
                    count: 1,
                });
            }
        }
    }
    if entries.is_empty() {
        return no_data("top_authors", NoDataReason::NoValues);
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(TOP_AUTHORS);
    Aggregate::Data(Ranking {
        title: "Top 10 Author Contributions".to_string(),
        entries,
    })
}

/// SDG tags per college. Rows are always the 17 goals in numeric order.
pub fn sdg_pivot(filtered: &RecordTable) -> Aggregate<PivotTable> {
    if !filtered.has_column(Column::SdgTargeted) {
        return no_data("sdg_pivot", NoDataReason::MissingColumn(Column::SdgTargeted));
    }
    if filtered.is_empty() {
        return no_data("sdg_pivot", NoDataReason::EmptySelection);
    }

    let pairs = filtered.records().iter().flat_map(|record| {
        record
            .sdg_tags()
            .map(move |tag| (tag, record.college.as_str()))
    });
    pivot(pairs, &SDG_TAGS, "Colleges Targeting Each SDG")
}

/// Publication status per college, rows in the fixed status order.
pub fn status_pivot(filtered: &RecordTable) -> Aggregate<PivotTable> {
    if filtered.is_empty() {
        return no_data("status_pivot", NoDataReason::EmptySelection);
    }

    let pairs = filtered
        .records()
        .iter()
        .map(|record| (record.published_status.as_str(), record.college.as_str()));
    pivot(pairs, &STATUSES, "Publication Status per College")
}

/// Publications per country, for dataset variants that carry one.
pub fn countries(filtered: &RecordTable) -> Aggregate<Share> {
    if !filtered.has_column(Column::Country) {
        return no_data("countries", NoDataReason::MissingColumn(Column::Country));
    }
    if filtered.is_empty() {
        return no_data("countries", NoDataReason::EmptySelection);
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for country in filtered
        .records()
        .iter()
        .filter_map(|record| record.country.as_deref())
    {
        *counts.entry(country.to_string()).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return no_data("countries", NoDataReason::NoValues);
    }

    Aggregate::Data(Share {
        title: "Number of Publications per Country".to_string(),
        dimension: Column::Country,
        slices: into_group_counts(counts),
    })
}

/// Header-card counts over the filtered rows.
pub fn summary_counts(filtered: &RecordTable) -> Result<SummaryCounts, QueryError> {
    let titles: HashSet<&str> = filtered
        .records()
        .iter()
        .map(|record| record.title.as_str())
        .collect();

    let status = Column::PublishedStatus;
    Ok(SummaryCounts {
        total_titles: titles.len(),
        published: filter::filter_equals(filtered, status, "PUBLISHED", false)?.len(),
        to_be_presented: filter::filter_equals(filtered, status, "TO BE PRESENTED", false)?.len(),
        scopus: filter::filter_equals(filtered, Column::ScopusClassification, "Scopus", false)?
            .len(),
        ongoing: filter::filter_in(filtered, status, &["PUBLISHED", "ACCEPTED"], true)?.len(),
    })
}

fn no_data<T>(aggregation: &str, reason: NoDataReason) -> Aggregate<T> {
    debug!(aggregation, ?reason, "no data for aggregation");
    Aggregate::NoData(reason)
}

fn single(selected: &BTreeSet<String>) -> Option<&str> {
    match selected.len() {
        1 => selected.iter().next().map(String::as_str),
        _ => None,
    }
}

fn group_value(record: &Record, dimension: Column) -> String {
    record
        .value(dimension)
        .map(|value| value.into_owned())
        .unwrap_or_default()
}

fn into_group_counts(counts: BTreeMap<String, usize>) -> Vec<GroupCount> {
    counts
        .into_iter()
        .map(|(label, count)| GroupCount { label, count })
        .collect()
}

fn tabulate<I>(pairs: I, key_a: &str, key_b: &str, title: &str) -> Aggregate<CrossTab>
where
    I: Iterator<Item = (String, String)>,
{
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for pair in pairs {
        *counts.entry(pair).or_insert(0) += 1;
    }

    Aggregate::Data(CrossTab {
        title: title.to_string(),
        key_a: key_a.to_string(),
        key_b: key_b.to_string(),
        cells: counts
            .into_iter()
            .map(|((key_a, key_b), count)| CrossTabCell {
                key_a,
                key_b,
                count,
            })
            .collect(),
    })
}

/// Counts `(row, college)` pairs into a zero-filled grid whose rows are
/// exactly `canonical`, in that order. Labels outside `canonical` still
/// contribute their college as a column but no row.
fn pivot<'a, I>(pairs: I, canonical: &[&str], title: &str) -> Aggregate<PivotTable>
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut colleges: BTreeSet<&str> = BTreeSet::new();
    for (row, college) in pairs {
        colleges.insert(college);
        *counts.entry((row, college)).or_insert(0) += 1;
    }
    if colleges.is_empty() {
        return no_data("pivot", NoDataReason::NoValues);
    }

    let cells: Vec<Vec<usize>> = canonical
        .iter()
        .map(|row| {
            colleges
                .iter()
                .map(|college| counts.get(&(*row, *college)).copied().unwrap_or(0))
                .collect()
        })
        .collect();
    let totals: Vec<usize> = cells.iter().map(|row| row.iter().sum()).collect();

    Aggregate::Data(PivotTable {
        title: title.to_string(),
        rows: canonical.iter().map(|row| row.to_string()).collect(),
        columns: colleges.into_iter().map(str::to_string).collect(),
        cells,
        totals,
    })
}
