use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use surveybar::chart::{self, StackedSeries};
use surveybar::{
    banded_summary, count, count_sorted, crosstab, load_table, normalize, Crosstab,
    RedactionConfig, ResponseTable, TaxonMap, BAND_LABELS,
};

#[derive(Parser, Debug)]
#[command(name = "surveybar")]
#[command(about = "Bar and stacked-bar charts over survey response CSVs", long_about = None)]
struct Cli {
    /// JSON file overriding the default privacy-column redaction list
    #[arg(long, global = true)]
    redact: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long, global = true, default_value_t = 800)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, global = true, default_value_t = 600)]
    height: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Survey CSV file
    #[arg(long)]
    data: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List selectable columns of a dataset (after redaction)
    Columns {
        #[command(flatten)]
        data: DataArgs,
    },
    /// List the distinct values of a column, for use with --keep
    Values {
        #[command(flatten)]
        data: DataArgs,
        /// Question/column name
        #[arg(long)]
        column: String,
    },
    /// Print response counts for a column, optionally cross-tabulated
    Counts {
        #[command(flatten)]
        data: DataArgs,
        /// Question/column name
        #[arg(long)]
        column: String,
        /// Cross-tabulate against this column
        #[arg(long)]
        group_by: Option<String>,
        /// Keep only these grouping values (repeatable; default: all)
        #[arg(long)]
        keep: Vec<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render a bar chart of response counts (stacked when grouped)
    Chart {
        #[command(flatten)]
        data: DataArgs,
        /// Question/column name
        #[arg(long)]
        column: String,
        /// Cross-tabulate against this column
        #[arg(long)]
        group_by: Option<String>,
        /// Keep only these grouping values (repeatable; default: all)
        #[arg(long)]
        keep: Vec<String>,
        /// Chart title (defaults to "Responses for <column>")
        #[arg(long)]
        title: Option<String>,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Summarize the "% of effort" taxa columns into quantile bands
    Effort {
        #[command(flatten)]
        data: DataArgs,
        /// Substring identifying the effort question's columns
        #[arg(long, default_value = "Identify the percentage of your effort")]
        marker: String,
        /// Write a stacked chart to this PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Annotate stacked segments with their counts
        #[arg(long)]
        annotate: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let redaction = match &cli.redact {
        Some(path) => RedactionConfig::from_file(path)?,
        None => RedactionConfig::default(),
    };

    match cli.command {
        Command::Columns { data } => {
            let table = load_table(&data.data, &redaction)?;
            for header in table.headers() {
                println!("{}", header);
            }
        }
        Command::Values { data, column } => {
            let table = load_table(&data.data, &redaction)?;
            for value in table.unique_values(&column)? {
                println!("{}", value);
            }
        }
        Command::Counts {
            data,
            column,
            group_by,
            keep,
            json,
        } => {
            let table = load_table(&data.data, &redaction)?;
            match group_by {
                Some(grouping) => {
                    let xt = run_crosstab(&table, &column, &grouping, &keep)?;
                    if xt.is_empty() {
                        println!("no data to display");
                    } else if json {
                        print_crosstab_json(&xt)?;
                    } else {
                        print_crosstab_text(&xt);
                    }
                }
                None => {
                    let entries = count_sorted(&count(&normalize(&table, &column)?));
                    if entries.is_empty() {
                        println!("no data to display");
                    } else if json {
                        let map: serde_json::Map<String, serde_json::Value> = entries
                            .iter()
                            .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&map)?);
                    } else {
                        for (label, n) in entries {
                            println!("{}\t{}", label, n);
                        }
                    }
                }
            }
        }
        Command::Chart {
            data,
            column,
            group_by,
            keep,
            title,
            output,
        } => {
            let table = load_table(&data.data, &redaction)?;
            let title = title.unwrap_or_else(|| format!("Responses for {}", column));

            let png = match group_by {
                Some(grouping) => {
                    let xt = run_crosstab(&table, &column, &grouping, &keep)?;
                    if xt.is_empty() {
                        println!("no data to display");
                        return Ok(());
                    }
                    let categories: Vec<String> =
                        xt.rows.iter().map(|r| r.category.clone()).collect();
                    let series: Vec<StackedSeries> = xt
                        .group_values
                        .iter()
                        .enumerate()
                        .map(|(g_idx, group)| StackedSeries {
                            label: group.clone(),
                            values: xt.rows.iter().map(|r| r.counts[g_idx]).collect(),
                        })
                        .collect();
                    chart::render_stacked_chart(
                        &title,
                        &column,
                        &categories,
                        &series,
                        &chart::CATEGORY_PALETTE,
                        false,
                        cli.width,
                        cli.height,
                    )?
                }
                None => {
                    let entries = count_sorted(&count(&normalize(&table, &column)?));
                    if entries.is_empty() {
                        println!("no data to display");
                        return Ok(());
                    }
                    chart::render_bar_chart(&title, &column, &entries, cli.width, cli.height)?
                }
            };

            write_png(&output, &png)?;
        }
        Command::Effort {
            data,
            marker,
            output,
            annotate,
        } => {
            let table = load_table(&data.data, &redaction)?;
            let map = TaxonMap {
                marker: Some(marker),
                ..TaxonMap::default()
            };
            let summary = banded_summary(&table, &map);
            if summary.is_empty() {
                println!("no data to display");
                return Ok(());
            }

            // Table first, chart second, matching the dashboard layout.
            println!("{:<28}{}", "Taxa Group", BAND_LABELS.join("\t"));
            for category in &summary {
                let counts: Vec<String> =
                    category.counts.iter().map(|c| c.to_string()).collect();
                println!("{:<28}{}", category.label, counts.join("\t"));
            }

            if let Some(output) = output {
                let categories: Vec<String> =
                    summary.iter().map(|c| c.label.clone()).collect();
                let series: Vec<StackedSeries> = BAND_LABELS
                    .iter()
                    .enumerate()
                    .map(|(band, label)| StackedSeries {
                        label: label.to_string(),
                        values: summary.iter().map(|c| c.counts[band]).collect(),
                    })
                    .collect();
                let png = chart::render_stacked_chart(
                    "Combined % Effort by Taxa Group",
                    "Taxa Group",
                    &categories,
                    &series,
                    &chart::BAND_PALETTE,
                    annotate,
                    cli.width,
                    cli.height,
                )?;
                write_png(&output, &png)?;
            }
        }
    }

    Ok(())
}

fn run_crosstab(
    table: &ResponseTable,
    column: &str,
    grouping: &str,
    keep: &[String],
) -> Result<Crosstab> {
    let allowed: HashSet<String> = keep.iter().cloned().collect();
    Ok(crosstab(table, column, grouping, &allowed)?)
}

fn print_crosstab_text(xt: &Crosstab) {
    println!("\t{}", xt.group_values.join("\t"));
    for row in &xt.rows {
        let counts: Vec<String> = row.counts.iter().map(|c| c.to_string()).collect();
        println!("{}\t{}", row.category, counts.join("\t"));
    }
}

fn print_crosstab_json(xt: &Crosstab) -> Result<()> {
    let rows: Vec<serde_json::Value> = xt
        .rows
        .iter()
        .map(|r| serde_json::json!({ "category": r.category, "counts": r.counts }))
        .collect();
    let value = serde_json::json!({ "groups": xt.group_values, "rows": rows });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn write_png(path: &PathBuf, png: &[u8]) -> Result<()> {
    fs::write(path, png).with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
