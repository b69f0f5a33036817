use std::sync::Arc;

use reqwest::Client;

use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::extract::ReadabilityExtractor;
use crate::llm::{LlmService, OpenAiCompatProvider};
use crate::pipeline::{PipelineComponents, ResearchPipeline};
use crate::research::{QueryPlanner, RelevanceClassifier, SearchFanout};
use crate::scrape::ScrapeService;
use crate::tools::{HttpFetcher, WebSearchProvider};
use crate::writer::ArticleWriter;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Every collaborator is constructed here once and handed to the pipeline
/// explicitly.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Settings,
    pub llm: LlmService,
    pub search: WebSearchProvider,
    pub scraper: Arc<ScrapeService>,
    pub pipeline: ResearchPipeline,
}

impl AppState {
    /// Loads configuration from the discovered paths and wires the pipeline.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());
        let raw = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        let settings = Settings::from_config(&raw);

        Self::from_settings(paths, config, settings)
    }

    pub fn from_settings(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: Settings,
    ) -> Result<Arc<Self>, InitializationError> {
        let http = Client::builder()
            .timeout(settings.search.timeout.max(settings.scrape.proxied_timeout))
            .build()
            .map_err(|e| InitializationError::Http(e.into()))?;

        let provider = OpenAiCompatProvider::new(
            settings.llm.base_url.clone(),
            settings.llm.api_key.clone(),
            settings.llm.timeout,
        )
        .map_err(|e| InitializationError::Llm(e.into()))?;
        let llm = LlmService::new(Arc::new(provider), settings.llm.clone());
        let generator = Arc::new(llm.clone());
        let fast_model = llm.fast_model();

        let search = WebSearchProvider::new(http.clone(), settings.search.clone());
        if !search.is_configured() {
            tracing::warn!(
                "Search provider {} has no credentials; research runs will find no sources",
                search.engine().as_str()
            );
        }

        let scraper = Arc::new(ScrapeService::new(
            Arc::new(HttpFetcher::new(http)),
            settings.scrape.clone(),
        ));
        if !scraper.proxy_available() {
            tracing::info!("Proxied scraping unavailable; requests will use the standard backend");
        }

        let pipeline = ResearchPipeline::new(
            PipelineComponents {
                planner: QueryPlanner::new(generator.clone(), fast_model.clone()),
                fanout: SearchFanout::new(Arc::new(search.clone())),
                scraper: scraper.clone(),
                extractor: Arc::new(ReadabilityExtractor::new(
                    settings.pipeline.min_article_chars,
                )),
                classifier: RelevanceClassifier::new(
                    generator.clone(),
                    fast_model.clone(),
                    settings.pipeline.relevance_excerpt_chars,
                ),
                writer: ArticleWriter::new(generator, fast_model),
            },
            settings.pipeline.clone(),
            settings.scrape.extraction_modes(),
        );

        Ok(Arc::new(AppState {
            paths,
            config,
            settings,
            llm,
            search,
            scraper,
            pipeline,
        }))
    }
}
