use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Columns the publication dataset knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Title,
    College,
    ProgramCluster,
    Year,
    PublishedStatus,
    ScopusClassification,
    PublicationFormat,
    Authors,
    SdgTargeted,
    Country,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Title,
        Column::College,
        Column::ProgramCluster,
        Column::Year,
        Column::PublishedStatus,
        Column::ScopusClassification,
        Column::PublicationFormat,
        Column::Authors,
        Column::SdgTargeted,
        Column::Country,
    ];

    /// Header name as it appears in the dataset file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::College => "College",
            Column::ProgramCluster => "Program/Cluster",
            Column::Year => "Year",
            Column::PublishedStatus => "PUBLISHED",
            Column::ScopusClassification => "Scopus or Non-Scopus",
            Column::PublicationFormat => "Publication Format",
            Column::Authors => "Authors",
            Column::SdgTargeted => "SDG Targeted",
            Column::Country => "Country",
        }
    }

    pub fn attribute(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::College => "college",
            Column::ProgramCluster => "program_cluster",
            Column::Year => "year",
            Column::PublishedStatus => "published_status",
            Column::ScopusClassification => "scopus_classification",
            Column::PublicationFormat => "publication_format",
            Column::Authors => "authors",
            Column::SdgTargeted => "sdg_targeted",
            Column::Country => "country",
        }
    }

    /// Authors, SDG tags and country are absent from some dataset variants.
    pub fn is_required(self) -> bool {
        !matches!(self, Column::Authors | Column::SdgTargeted | Column::Country)
    }

    /// Matches either the dataset header or the attribute name, ignoring case.
    pub fn lookup(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL.into_iter().find(|column| {
            column.header().eq_ignore_ascii_case(name)
                || column.attribute().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::lookup(s).ok_or_else(|| QueryError::ColumnNotFound(s.to_string()))
    }
}

/// One research publication entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "College")]
    pub college: String,
    #[serde(rename = "Program/Cluster")]
    pub program_cluster: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "PUBLISHED")]
    pub published_status: String,
    #[serde(rename = "Scopus or Non-Scopus")]
    pub scopus_classification: String,
    #[serde(rename = "Publication Format")]
    pub publication_format: String,
    #[serde(rename = "Authors", default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(rename = "SDG Targeted", default, skip_serializing_if = "Option::is_none")]
    pub sdg_targeted: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Record {
    /// Cell value for `column`, `None` for a null optional cell.
    pub fn value(&self, column: Column) -> Option<Cow<'_, str>> {
        match column {
            Column::Title => Some(Cow::Borrowed(&self.title)),
            Column::College => Some(Cow::Borrowed(&self.college)),
            Column::ProgramCluster => Some(Cow::Borrowed(&self.program_cluster)),
            Column::Year => Some(Cow::Owned(self.year.to_string())),
            Column::PublishedStatus => Some(Cow::Borrowed(&self.published_status)),
            Column::ScopusClassification => Some(Cow::Borrowed(&self.scopus_classification)),
            Column::PublicationFormat => Some(Cow::Borrowed(&self.publication_format)),
            Column::Authors => self.authors.as_deref().map(Cow::Borrowed),
            Column::SdgTargeted => self.sdg_targeted.as_deref().map(Cow::Borrowed),
            Column::Country => self.country.as_deref().map(Cow::Borrowed),
        }
    }

    /// SDG tags split on `;` and trimmed. Empty when the cell is null.
    pub fn sdg_tags(&self) -> impl Iterator<Item = &str> {
        self.sdg_targeted
            .as_deref()
            .into_iter()
            .flat_map(|tags| tags.split(';'))
            .map(str::trim)
    }
}

/// Immutable, fully materialized table of publication records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Same schema, different rows. Used for filter results.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Columns present in this dataset variant, in header order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn require(&self, column: Column) -> Result<(), QueryError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(QueryError::ColumnNotFound(column.header().to_string()))
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single cell value, ordered numerically for integers and lexicographically for text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// User-selected filter values. Empty college or status sets select nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    colleges: BTreeSet<String>,
    statuses: BTreeSet<String>,
    year_range: YearRange,
}

impl FilterCriteria {
    pub fn new<C, S>(colleges: C, statuses: S, min: i32, max: i32) -> Result<Self, QueryError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        if min > max {
            return Err(QueryError::InvertedYearRange { min, max });
        }
        Ok(Self {
            colleges: colleges.into_iter().map(Into::into).collect(),
            statuses: statuses.into_iter().map(Into::into).collect(),
            year_range: YearRange { min, max },
        })
    }

    pub fn colleges(&self) -> &BTreeSet<String> {
        &self.colleges
    }

    pub fn statuses(&self) -> &BTreeSet<String> {
        &self.statuses
    }

    pub fn year_range(&self) -> YearRange {
        self.year_range
    }
}

/// Why an aggregation produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "column", rename_all = "snake_case")]
pub enum NoDataReason {
    /// The filtered table has zero rows.
    EmptySelection,
    /// An optional column is absent from this dataset variant.
    MissingColumn(Column),
    /// Rows exist but none carries a usable value for the aggregation.
    NoValues,
}

impl NoDataReason {
    pub fn title(self) -> &'static str {
        match self {
            NoDataReason::MissingColumn(Column::Authors) => "No Author Data Available",
            _ => "No data available",
        }
    }
}

/// Outcome of an aggregation: either a result (possibly all zeros) or the no-data sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Aggregate<T> {
    NoData(NoDataReason),
    Data(T),
}

impl<T> Aggregate<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Aggregate::NoData(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Aggregate::Data(value) => Some(value),
            Aggregate::NoData(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub group: String,
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub title: String,
    pub dimension: Column,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub title: String,
    pub dimension: Column,
    pub slices: Vec<GroupCount>,
}

impl Share {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|slice| slice.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTabCell {
    pub key_a: String,
    pub key_b: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub title: String,
    pub key_a: String,
    pub key_b: String,
    pub cells: Vec<CrossTabCell>,
}

impl CrossTab {
    pub fn count(&self, key_a: &str, key_b: &str) -> usize {
        self.cells
            .iter()
            .find(|cell| cell.key_a == key_a && cell.key_b == key_b)
            .map(|cell| cell.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|cell| cell.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub title: String,
    pub entries: Vec<GroupCount>,
}

/// Rows in canonical order, colleges as columns, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub title: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<usize>>,
    pub totals: Vec<usize>,
}

impl PivotTable {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.cells[r][c])
    }
}

/// Header-card counts shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub total_titles: usize,
    pub published: usize,
    pub to_be_presented: usize,
    pub scopus: usize,
    pub ongoing: usize,
}
