use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::extraction::{Dictionary, JobAnalyzer, ResumeExtractor};
use crate::matching::{KeywordMatchScorer, MatchScorer};
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub extractor: Arc<ResumeExtractor>,
    pub analyzer: Arc<JobAnalyzer>,
    /// Pluggable scorer. Default: KeywordMatchScorer.
    pub scorer: Arc<dyn MatchScorer>,
}

impl AppState {
    /// Builds the pipeline around one shared dictionary.
    pub fn new(config: Config, dictionary: Dictionary) -> Result<Self> {
        let dictionary = Arc::new(dictionary);
        let extractor =
            ResumeExtractor::new(dictionary.clone()).context("compiling resume patterns")?;
        let analyzer = JobAnalyzer::new(dictionary.clone()).context("compiling job patterns")?;

        Ok(Self {
            storage: Storage::open(&config.data_dir),
            extractor: Arc::new(extractor),
            analyzer: Arc::new(analyzer),
            scorer: Arc::new(KeywordMatchScorer::new(dictionary)),
            config,
        })
    }
}
