use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use publication_dashboard::models::YearRange;
use publication_dashboard::report::{self, ChartKind};
use publication_dashboard::{
    aggregate, filter, store, Column, FilterCriteria, QueryError, RecordTable,
};

#[derive(Parser)]
#[command(name = "publication-dashboard")]
#[command(about = "Research publication analytics by college, status and year", long_about = None)]
struct Cli {
    /// Publications CSV; falls back to PUBLICATIONS_CSV
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header-card counts
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print one chart's aggregation
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the filtered records
    Grid {
        #[arg(long, value_enum, default_value_t = GridFormat::Csv)]
        format: GridFormat,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Generate a markdown report with every chart
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List the distinct values and range of a column
    Values { column: Column },
}

/// Omitted filters fall back to the full selection.
#[derive(Args)]
struct FilterArgs {
    #[arg(long = "college")]
    colleges: Vec<String>,
    #[arg(long = "status")]
    statuses: Vec<String>,
    #[arg(long)]
    from_year: Option<i32>,
    #[arg(long)]
    to_year: Option<i32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GridFormat {
    Csv,
    Json,
}

impl FilterArgs {
    /// Only the omitted flags consult the table, so an empty dataset still
    /// resolves and every chart reports no data.
    fn resolve(self, table: &RecordTable) -> anyhow::Result<FilterCriteria> {
        let colleges = if self.colleges.is_empty() {
            store::distinct_values(table, Column::College)?
        } else {
            self.colleges
        };
        let statuses = if self.statuses.is_empty() {
            store::distinct_values(table, Column::PublishedStatus)?
        } else {
            self.statuses
        };
        let (min, max) = match (self.from_year, self.to_year) {
            (Some(min), Some(max)) => (min, max),
            (from, to) => {
                let years = match store::year_bounds(table) {
                    Ok(years) => years,
                    Err(QueryError::EmptyTable(_)) => YearRange {
                        min: i32::MIN,
                        max: i32::MAX,
                    },
                    Err(err) => return Err(err.into()),
                };
                (from.unwrap_or(years.min), to.unwrap_or(years.max))
            }
        };
        Ok(FilterCriteria::new(colleges, statuses, min, max)?)
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let data_path = match cli.data {
        Some(path) => path,
        None => std::env::var("PUBLICATIONS_CSV")
            .map(PathBuf::from)
            .context("--data or PUBLICATIONS_CSV must point at the publications CSV")?,
    };
    let table = store::load(&data_path)
        .with_context(|| format!("failed to load {}", data_path.display()))?;

    match cli.command {
        Commands::Summary { filters } => {
            let criteria = filters.resolve(&table)?;
            let filtered = filter::filter(&table, &criteria);
            let summary = aggregate::summary_counts(&filtered)?;
            let mut output = String::new();
            report::write_summary(&mut output, &summary);
            print!("{output}");
        }
        Commands::Chart {
            kind,
            json,
            filters,
        } => {
            let criteria = filters.resolve(&table)?;
            let filtered = filter::filter(&table, &criteria);
            let chart = report::chart(kind, &filtered, &criteria);
            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else {
                let mut output = String::new();
                chart.write_markdown(&mut output);
                print!("{output}");
            }
        }
        Commands::Grid { format, filters } => {
            let criteria = filters.resolve(&table)?;
            let filtered = filter::filter(&table, &criteria);
            match format {
                GridFormat::Csv => write_grid_csv(&filtered, io::stdout())?,
                GridFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(filtered.records())?);
                }
            }
        }
        Commands::Report { out, filters } => {
            let criteria = filters.resolve(&table)?;
            let filtered = filter::filter(&table, &criteria);
            let report =
                report::build_report(&criteria, &filtered, chrono::Utc::now().date_naive())?;
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Values { column } => {
            let values = store::distinct_values(&table, column)?;
            println!("{} distinct values in {}:", values.len(), column);
            for value in &values {
                println!("- {value}");
            }
            if let (Ok(min), Ok(max)) = (
                store::min_value(&table, column),
                store::max_value(&table, column),
            ) {
                println!("Range: {min} to {max}");
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; DASHBOARD_LOG_FORMAT=json switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "publication_dashboard=info".into());
    let layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    match std::env::var("DASHBOARD_LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init(),
        _ => tracing_subscriber::registry().with(filter).with(layer).init(),
    }
}

/// Filtered rows with only the columns this dataset variant carries.
fn write_grid_csv<W: io::Write>(table: &RecordTable, sink: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(table.columns().iter().map(|column| column.header()))?;
    for record in table.records() {
        writer.write_record(table.columns().iter().map(|column| {
            record
                .value(*column)
                .map(|value| value.into_owned())
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use publication_dashboard::{Aggregate, NoDataReason};

    use super::*;

    const CSV: &str = "\
Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format
A,CAS,Biology,2020,PUBLISHED,Scopus,Journal
B,CAS,Psychology,2021,PUBLISHED,Non-Scopus,Proceeding
C,CCIS,Computer Science,2022,ACCEPTED,Scopus,Journal
";

    fn table() -> RecordTable {
        store::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn omitted_filters_select_everything() {
        let table = table();
        let args = FilterArgs {
            colleges: Vec::new(),
            statuses: Vec::new(),
            from_year: None,
            to_year: None,
        };
        assert_eq!(args.resolve(&table).unwrap(), FilterCriteria::all(&table).unwrap());
    }

    #[test]
    fn explicit_filters_override_defaults() {
        let table = table();
        let args = FilterArgs {
            colleges: vec!["CAS".to_string()],
            statuses: Vec::new(),
            from_year: Some(2021),
            to_year: None,
        };
        let criteria = args.resolve(&table).unwrap();
        assert_eq!(criteria.colleges().len(), 1);
        assert_eq!(criteria.statuses().len(), 2);
        assert_eq!(criteria.year_range().min, 2021);
        assert_eq!(criteria.year_range().max, 2022);

        let inverted = FilterArgs {
            colleges: Vec::new(),
            statuses: Vec::new(),
            from_year: Some(2023),
            to_year: Some(2020),
        };
        assert!(inverted.resolve(&table).is_err());
    }

    #[test]
    fn header_only_dataset_resolves_to_no_data() {
        let empty = store::from_reader(CSV.lines().next().unwrap_or_default().as_bytes()).unwrap();
        assert!(empty.is_empty());

        let explicit = FilterArgs {
            colleges: vec!["CAS".to_string()],
            statuses: vec!["PUBLISHED".to_string()],
            from_year: Some(2020),
            to_year: Some(2021),
        };
        let criteria = explicit.resolve(&empty).unwrap();
        assert_eq!(criteria.year_range(), YearRange { min: 2020, max: 2021 });

        let defaults = FilterArgs {
            colleges: Vec::new(),
            statuses: Vec::new(),
            from_year: None,
            to_year: Some(2021),
        };
        let criteria = defaults.resolve(&empty).unwrap();
        assert!(criteria.colleges().is_empty());
        assert_eq!(criteria.year_range().max, 2021);

        let filtered = filter::filter(&empty, &criteria);
        let summary = aggregate::summary_counts(&filtered).unwrap();
        assert_eq!(summary.total_titles, 0);
        assert_eq!(
            aggregate::timeline(&filtered, criteria.colleges()),
            Aggregate::NoData(NoDataReason::EmptySelection)
        );
    }

    #[test]
    fn grid_csv_keeps_only_present_columns() {
        let table = table();
        let mut buffer = Vec::new();
        write_grid_csv(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format")
        );
        assert_eq!(lines.next(), Some("A,CAS,Biology,2020,PUBLISHED,Scopus,Journal"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn cli_parses_repeated_filters() {
        let cli = Cli::try_parse_from([
            "publication-dashboard",
            "chart",
            "scopus-format",
            "--college",
            "CAS",
            "--college",
            "CCIS",
            "--json",
            "--data",
            "pubs.csv",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("pubs.csv")));
        match cli.command {
            Commands::Chart {
                kind,
                json,
                filters,
            } => {
                assert_eq!(kind, ChartKind::ScopusFormat);
                assert!(json);
                assert_eq!(filters.colleges, vec!["CAS", "CCIS"]);
            }
            _ => panic!("expected chart command"),
        }

        let values = Cli::try_parse_from(["publication-dashboard", "values", "program_cluster"])
            .unwrap();
        assert!(matches!(
            values.command,
            Commands::Values {
                column: Column::ProgramCluster
            }
        ));
    }
}
