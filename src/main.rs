mod catalog;
mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod storage;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::catalog::ChartKind;
use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "chart-scraper", about = "Movie chart scraper: IMDb and Rotten Tomatoes to CSV", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every chart, in catalog order, into the data directory
    Scrape {
        /// Directory for the CSV files (overrides output.data_dir)
        #[arg(short, long, env = "CHARTS_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Continue with the remaining charts when one fails
        #[arg(long)]
        keep_going: bool,
    },

    /// Scrape a single chart
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,

        /// Directory for the CSV file (overrides output.data_dir)
        #[arg(short, long, env = "CHARTS_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Look up the IMDb ID of a title via the search page
    Lookup {
        title: String,
    },

    /// Show the chart catalog
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "chart_scraper=info,warn",
        1 => "chart_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Scrape { data_dir, keep_going } => {
            let data_dir = data_dir.unwrap_or_else(|| config.output.data_dir.clone());
            if keep_going {
                config.pipeline.stop_on_error = false;
            }

            let stats = Pipeline::new(config)?.run(&data_dir).await?;
            info!(
                "Done: {} charts, {} records, {} errors in {:.2?}",
                stats.charts_written, stats.records_written, stats.errors, stats.elapsed
            );
            if stats.errors > 0 {
                bail!("{} of {} charts failed", stats.errors, catalog::CHARTS.len());
            }
        }

        Command::Chart { kind, data_dir } => {
            let def = catalog::chart(kind);
            let data_dir = data_dir.unwrap_or_else(|| config.output.data_dir.clone());
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("Could not create dir {:?}", data_dir))?;

            let stats = Pipeline::new(config)?
                .scrape_chart(def, &data_dir.join(def.file_name))
                .await?;
            info!(
                "Done: {:?} → {} records in {:?} ({:.2?})",
                stats.kind, stats.records, stats.path, stats.elapsed
            );
        }

        Command::Lookup { title } => {
            match Pipeline::new(config)?.resolve_identifier(&title).await? {
                Some(id) => println!("{}", id),
                None => println!("No match for {:?}", title),
            }
        }

        Command::List => {
            println!("─────────────────────────────────");
            println!("  Chart catalog");
            println!("─────────────────────────────────");
            for def in catalog::CHARTS {
                println!("  {:<32} {}", def.name, def.url(&config.scraper));
                println!("  {:<32} → {}", "", def.file_name);
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
