use std::fmt::Write;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::aggregate;
use crate::error::QueryError;
use crate::models::{
    Aggregate, CrossTab, FilterCriteria, PivotTable, Ranking, RecordTable, Share, SummaryCounts,
    TimeSeries,
};

/// Visualizations the dashboard offers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Publications per year by college, or by program for one college
    Timeline,
    /// Share of publications by college, or by program for one college
    Share,
    /// Scopus vs. Non-Scopus per college
    Scopus,
    /// Journal vs. Proceeding per college
    Format,
    /// Scopus classification and format combined, per college
    ScopusFormat,
    /// Top 10 author contributions
    Authors,
    /// SDG targets per college
    Sdg,
    /// Publication status per college
    Status,
    /// Publications per country
    Countries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Chart {
    Timeline(Aggregate<TimeSeries>),
    Share(Aggregate<Share>),
    CrossTab(Aggregate<CrossTab>),
    Ranking(Aggregate<Ranking>),
    Pivot(Aggregate<PivotTable>),
}

pub fn chart(kind: ChartKind, filtered: &RecordTable, criteria: &FilterCriteria) -> Chart {
    match kind {
        ChartKind::Timeline => Chart::Timeline(aggregate::timeline(filtered, criteria.colleges())),
        ChartKind::Share => Chart::Share(aggregate::share(filtered, criteria.colleges())),
        ChartKind::Scopus => Chart::CrossTab(aggregate::scopus_by_college(filtered)),
        ChartKind::Format => Chart::CrossTab(aggregate::format_by_college(filtered)),
        ChartKind::ScopusFormat => Chart::CrossTab(aggregate::scopus_format_by_college(filtered)),
        ChartKind::Authors => Chart::Ranking(aggregate::top_authors(filtered)),
        ChartKind::Sdg => Chart::Pivot(aggregate::sdg_pivot(filtered)),
        ChartKind::Status => Chart::Pivot(aggregate::status_pivot(filtered)),
        ChartKind::Countries => Chart::Share(aggregate::countries(filtered)),
    }
}

impl Chart {
    pub fn write_markdown(&self, output: &mut String) {
        match self {
            Chart::Timeline(result) => section(output, result, |t| &t.title, write_time_series),
            Chart::Share(result) => section(output, result, |s| &s.title, write_share),
            Chart::CrossTab(result) => section(output, result, |c| &c.title, write_cross_tab),
            Chart::Ranking(result) => section(output, result, |r| &r.title, write_ranking),
            Chart::Pivot(result) => section(output, result, |p| &p.title, write_pivot),
        }
    }
}

pub fn build_report(
    criteria: &FilterCriteria,
    filtered: &RecordTable,
    generated_on: NaiveDate,
) -> Result<String, QueryError> {
    let summary = aggregate::summary_counts(filtered)?;
    let years = criteria.year_range();

    let mut output = String::new();
    let _ = writeln!(output, "# Research Publication Dashboard");
    let _ = writeln!(
        output,
        "Generated on {} for {} ({}), {} to {}",
        generated_on,
        join_or_none(criteria.colleges()),
        join_or_none(criteria.statuses()),
        years.min,
        years.max
    );
    let _ = writeln!(output);
    write_summary(&mut output, &summary);

    for kind in ChartKind::value_variants() {
        let _ = writeln!(output);
        chart(*kind, filtered, criteria).write_markdown(&mut output);
    }

    Ok(output)
}

pub fn write_summary(output: &mut String, summary: &SummaryCounts) {
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total research papers: {}", summary.total_titles);
    let _ = writeln!(output, "- Published papers: {}", summary.published);
    let _ = writeln!(output, "- Papers to be presented: {}", summary.to_be_presented);
    let _ = writeln!(output, "- Scopus-indexed papers: {}", summary.scopus);
    let _ = writeln!(output, "- Ongoing papers: {}", summary.ongoing);
}

fn section<T>(
    output: &mut String,
    result: &Aggregate<T>,
    title: impl Fn(&T) -> &String,
    body: impl Fn(&mut String, &T),
) {
    match result {
        Aggregate::Data(data) => {
            let _ = writeln!(output, "## {}", title(data));
            body(output, data);
        }
        Aggregate::NoData(reason) => {
            let _ = writeln!(output, "## {}", reason.title());
            let _ = writeln!(output, "No data recorded for this selection.");
        }
    }
}

fn write_time_series(output: &mut String, series: &TimeSeries) {
    let _ = writeln!(output, "| {} | Year | Publications |", series.dimension);
    let _ = writeln!(output, "|---|---|---|");
    for point in &series.points {
        let _ = writeln!(output, "| {} | {} | {} |", point.group, point.year, point.count);
    }
}

fn write_share(output: &mut String, share: &Share) {
    let total = share.total();
    for slice in &share.slices {
        let percent = if total == 0 {
            0.0
        } else {
            slice.count as f64 * 100.0 / total as f64
        };
        let _ = writeln!(output, "- {}: {} ({:.1}%)", slice.label, slice.count, percent);
    }
}

fn write_cross_tab(output: &mut String, tab: &CrossTab) {
    let _ = writeln!(output, "| {} | {} | Count |", tab.key_b, tab.key_a);
    let _ = writeln!(output, "|---|---|---|");
    for cell in &tab.cells {
        let _ = writeln!(output, "| {} | {} | {} |", cell.key_b, cell.key_a, cell.count);
    }
}

fn write_ranking(output: &mut String, ranking: &Ranking) {
    for (rank, entry) in ranking.entries.iter().enumerate() {
        let _ = writeln!(output, "{}. {} ({})", rank + 1, entry.label, entry.count);
    }
}

fn write_pivot(output: &mut String, pivot: &PivotTable) {
    let _ = writeln!(output, "|  | {} | Total |", pivot.columns.join(" | "));
    let _ = writeln!(output, "|---{}|---|", "|---".repeat(pivot.columns.len()));
    for ((row, cells), total) in pivot.rows.iter().zip(&pivot.cells).zip(&pivot.totals) {
        let cells: Vec<String> = cells.iter().map(usize::to_string).collect();
        let _ = writeln!(output, "| {} | {} | {} |", row, cells.join(" | "), total);
    }
}

fn join_or_none<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = values.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}
