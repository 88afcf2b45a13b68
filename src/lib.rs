//! Loader of product review datasets into review graphs
//!
//! Review graph mining algorithms look for anomalous reviewers in bipartite
//! graphs of reviewers and products, connected by reviews. This crate
//! downloads a review dataset on first use, parses its records, and feeds them
//! into any graph that implements [`ReviewGraph`]:
//!
//! ```no_run
//! # async fn example() -> review_graph_loader::Result<()> {
//! use review_graph_loader::{load, MemoryGraph};
//!
//! let mut graph = MemoryGraph::new();
//! let stats = load(&mut graph, Some(&["cameras", "tablets"])).await?;
//! println!("Loaded {} reviews", stats.loaded);
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod progress;
pub mod record;
pub mod state;
pub mod text;

pub use crate::{
    acquire::ensure_local,
    catalog::{Category, CategoryFilter, DatasetFormat, DatasetInfo, AMAZON_REVIEWS},
    config::Config,
    error::{AcquisitionError, EncodingError, Error},
    graph::{MemoryGraph, ReviewGraph},
    loader::LoadStats,
    progress::ProgressReport,
    record::{ParsedReview, Rating, RecordError},
    state::{print_state, GraphState, Iteration},
};

use crate::loader::Loader;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Result type of dataset loading
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Load the Amazon review dataset into a graph
///
/// If categories are specified, only reviews of products from these
/// categories are loaded. No categories means all categories. Asking for a
/// category that the dataset does not have fails with
/// [`Error::UnknownCategory`] before anything is downloaded.
///
/// The dataset is downloaded into the default location on first use, see
/// [`Config::new()`].
pub async fn load<G: ReviewGraph>(graph: &mut G, categories: Option<&[&str]>) -> Result<LoadStats> {
    let config = Config::new(AMAZON_REVIEWS);
    let filter = CategoryFilter::new(&config.dataset, categories.unwrap_or_default())?;
    load_with(
        &config,
        &reqwest::Client::new(),
        &ProgressReport::hidden(),
        graph,
        filter.as_ref(),
    )
    .await
}

/// Load a dataset into a graph, with full control over the process
///
/// The dataset file is downloaded first if there is no local copy of it yet.
/// Then every record is parsed, in file order. Malformed records are logged
/// and skipped, records from categories that `filter` rejects are skipped, and
/// every other record is added to the graph.
pub async fn load_with<G: ReviewGraph>(
    config: &Config,
    client: &reqwest::Client,
    report: &ProgressReport,
    graph: &mut G,
    filter: Option<&CategoryFilter>,
) -> Result<LoadStats> {
    ensure_local(client, &config.data_file, &config.url, report).await?;
    log::info!(
        "Loading {} from {}",
        config.dataset.name,
        config.data_file.display()
    );
    let mut loader = Loader::new(graph, filter);
    match config.dataset.format {
        DatasetFormat::Text => text::load(config, &mut loader, report).await?,
        DatasetFormat::Archive => {
            // Zip archives can only be read synchronously
            let mut load = || archive::load(config, &mut loader, report);
            match Handle::try_current().map(|handle| handle.runtime_flavor()) {
                Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(load)?,
                _ => load()?,
            }
        }
    }
    let stats = loader.stats();
    log::info!(
        "Loaded {} reviews from {} ({} filtered out, {} malformed)",
        stats.loaded,
        config.data_file.display(),
        stats.filtered,
        stats.malformed
    );
    Ok(stats)
}
