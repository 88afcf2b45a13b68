//! Load the Amazon product review dataset into an in-memory review graph, and
//! print the resulting graph state as JSON lines.
//!
//! The dataset was published by the Latent Aspect Rating Analysis project, see
//! <http://times.cs.uiuc.edu/~wang296/Data/>.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use review_graph_loader::{
    catalog, print_state, CategoryFilter, Config, DatasetFormat,
    Iteration, MemoryGraph, ProgressReport, AMAZON_REVIEWS,
};
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Load a product review dataset into a review graph
///
/// The dataset is downloaded on first use, then reused on subsequent runs.
/// Once loaded, the state of every reviewer and product of the graph is
/// printed as one JSON object per line.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Product category to be loaded, e.g. "cameras"
    ///
    /// Can be specified multiple times to load several categories. By default,
    /// all categories are loaded.
    #[arg(short, long)]
    category: Vec<Box<str>>,

    /// Interactively pick the product categories to be loaded
    #[arg(short, long, default_value_t = false)]
    pick_categories: bool,

    /// Local copy of the dataset
    ///
    /// Will be downloaded if it does not exist. By default, the dataset is
    /// looked up in the working directory, then in the user data directory.
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Where the dataset should be downloaded from
    #[arg(long)]
    url: Option<Box<str>>,

    /// Layout of the dataset file
    ///
    /// By default, the dataset is assumed to be a review archive.
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Text encoding of the dataset, as a WHATWG label
    ///
    /// By default, text datasets are decoded as windows-1252 and review
    /// archives as UTF-8.
    #[arg(short, long)]
    encoding: Option<Box<str>>,

    /// Where the graph state should be written (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        let args = Args::parse();
        anyhow::ensure!(
            !(args.pick_categories && !args.category.is_empty()),
            "categories can either be picked interactively or specified on the command line, not both"
        );
        Ok(args)
    }

    /// Dataset loading configuration
    pub fn config(&self) -> Result<Config> {
        let mut dataset = AMAZON_REVIEWS;
        if let Some(format) = self.format {
            dataset.format = format.into();
        }
        let mut config = Config::new(dataset);
        if let Some(encoding) = &self.encoding {
            config = config
                .with_encoding(encoding)
                .context("selecting the dataset's text encoding")?;
        }
        if let Some(data_file) = &self.data_file {
            config = config.with_data_file(data_file);
        }
        if let Some(url) = &self.url {
            config = config.with_url(url.clone());
        }
        Ok(config)
    }

    /// Categories that the load is restricted to, if any
    pub fn category_filter(&self, config: &Config) -> Result<Option<CategoryFilter>> {
        let filter = if self.pick_categories {
            let picked = catalog::prompt(&config.dataset).context("picking categories")?;
            CategoryFilter::new(&config.dataset, picked)
        } else {
            CategoryFilter::new(&config.dataset, &self.category)
        };
        Ok(filter?)
    }
}

/// Dataset file layout, as specified on the command line
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    /// Blank-line separated `label: value` records, optionally gzipped
    Text,

    /// Zip archive of per-product JSON documents
    Archive,
}
//
impl From<Format> for DatasetFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Text => DatasetFormat::Text,
            Format::Archive => DatasetFormat::Archive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let args = Args::parse_and_check()?;
    let config = args.config()?;
    let filter = args.category_filter(&config)?;

    // Load the dataset
    let report = ProgressReport::new();
    let client = reqwest::Client::new();
    let mut graph = MemoryGraph::new();
    let stats = review_graph_loader::load_with(&config, &client, &report, &mut graph, filter.as_ref())
        .await
        .with_context(|| format!("loading {}", config.dataset.name))?;
    log::info!(
        "Graph has {} reviewers, {} products and {} reviews ({} records filtered out, {} malformed)",
        graph.reviewers().len(),
        graph.products().len(),
        graph.reviews().len(),
        stats.filtered,
        stats.malformed,
    );

    // Display the final graph state
    let mut state = Vec::new();
    print_state(&graph, Iteration::Final, &mut state).context("serializing graph state")?;
    match &args.output {
        Some(path) => tokio::fs::write(path, &state)
            .await
            .with_context(|| format!("writing graph state to {}", path.display()))?,
        None => {
            let mut stdout = BufWriter::new(tokio::io::stdout());
            stdout.write_all(&state).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
