use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::debug::DebugTrail;
use super::settle::{panic_message, settle_all};
use super::stage::{PipelineError, PipelineStage};
use crate::core::config::settings::PipelineSettings;
use crate::extract::{ContentExtractor, ExtractionModes, ExtractionOutcome};
use crate::models::{GenerationRequest, GenerationResult, QualityMode, SeoRequest, SeoResult};
use crate::research::{aggregate, QueryPlanner, RelevanceClassifier, SearchFanout, SourceText};
use crate::scrape::{PageScraper, ScrapeBackendKind, ScrapeResult};
use crate::writer::{ArticleDraft, ArticleWriter, GenerationMode};

/// Collaborators a pipeline is assembled from.
pub struct PipelineComponents {
    pub planner: QueryPlanner,
    pub fanout: SearchFanout,
    pub scraper: Arc<dyn PageScraper>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub classifier: RelevanceClassifier,
    pub writer: ArticleWriter,
}

enum Finish {
    Completed(ArticleDraft),
    InsufficientContext,
}

/// Drives plan -> search -> scrape -> filter -> aggregate -> generate.
///
/// `run` and `run_seo_only` always resolve to a result; every failure is
/// folded into a placeholder document plus the debug record.
#[derive(Clone)]
pub struct ResearchPipeline {
    planner: QueryPlanner,
    fanout: SearchFanout,
    scraper: Arc<dyn PageScraper>,
    extractor: Arc<dyn ContentExtractor>,
    classifier: RelevanceClassifier,
    writer: ArticleWriter,
    settings: PipelineSettings,
    extraction: ExtractionModes,
}

impl ResearchPipeline {
    pub fn new(
        components: PipelineComponents,
        settings: PipelineSettings,
        extraction: ExtractionModes,
    ) -> Self {
        Self {
            planner: components.planner,
            fanout: components.fanout,
            scraper: components.scraper,
            extractor: components.extractor,
            classifier: components.classifier,
            writer: components.writer,
            settings,
            extraction,
        }
    }

    pub fn writer(&self) -> &ArticleWriter {
        &self.writer
    }

    pub async fn run(&self, request: &GenerationRequest) -> GenerationResult {
        let trail = DebugTrail::new();
        let run_id = Uuid::new_v4().to_string();
        trail.record("run_id", &run_id);
        trail.record("mode", request.quality.as_str());
        trail.record(
            "scraper",
            json!({ "requested": request.scrape_backend.as_str() }),
        );
        tracing::info!(
            "[pipeline] run {} started (topic={:?}, mode={})",
            run_id,
            request.topic,
            request.quality.as_str()
        );

        if let Err(err) = request.validate() {
            return fail_generation(trail, PipelineError::new(PipelineStage::Planning, err.to_string()));
        }

        let outcome = AssertUnwindSafe(self.drive(request, &trail))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(Finish::Completed(draft))) => {
                trail.enter(PipelineStage::Done);
                tracing::info!("[pipeline] run {} completed", run_id);
                GenerationResult::completed(
                    draft.html_content,
                    draft.seo_title,
                    draft.seo_description,
                    trail.into_record(),
                )
            }
            Ok(Ok(Finish::InsufficientContext)) => {
                trail.enter(PipelineStage::AbortedInsufficientContext);
                tracing::warn!("[pipeline] run {} aborted: insufficient research context", run_id);
                GenerationResult::insufficient_context(trail.into_record())
            }
            Ok(Err(error)) => fail_generation(trail, error),
            Err(payload) => {
                let error = panic_error(&trail, panic_message(payload.as_ref()));
                fail_generation(trail, error)
            }
        }
    }

    /// Metadata-only mode: no search, no scraping.
    pub async fn run_seo_only(&self, request: &SeoRequest) -> SeoResult {
        let trail = DebugTrail::new();
        trail.record("run_id", Uuid::new_v4().to_string());
        trail.record("mode", "seo_only");

        let topic = request.topic.trim();
        if topic.is_empty() {
            return fail_seo(
                trail,
                PipelineError::new(PipelineStage::Generating, "topic must not be empty"),
            );
        }

        trail.enter(PipelineStage::Generating);
        let outcome = AssertUnwindSafe(self.writer.seo_only(
            topic,
            &request.keywords,
            request.model.clone(),
        ))
        .catch_unwind()
        .await;

        match outcome {
            Ok(Ok(metadata)) => {
                trail.record("seo", &metadata);
                trail.enter(PipelineStage::Done);
                SeoResult::completed(metadata, trail.into_record())
            }
            Ok(Err(err)) => {
                let error = PipelineError::new(PipelineStage::Generating, err.to_string())
                    .with_trace(trail.stages());
                fail_seo(trail, error)
            }
            Err(payload) => {
                let error = panic_error(&trail, panic_message(payload.as_ref()));
                fail_seo(trail, error)
            }
        }
    }

    async fn drive(
        &self,
        request: &GenerationRequest,
        trail: &DebugTrail,
    ) -> Result<Finish, PipelineError> {
        let context = match request.quality {
            QualityMode::Standard => None,
            QualityMode::HighQuality => match self.research(request, trail).await {
                Some(context) => Some(context),
                None => return Ok(Finish::InsufficientContext),
            },
        };

        trail.enter(PipelineStage::Generating);
        let mode = if context.is_some() {
            GenerationMode::RagContext
        } else {
            GenerationMode::Standard
        };
        trail.record("generation_mode", mode.as_str());

        self.writer
            .generate(mode, request, context.as_deref())
            .await
            .map(Finish::Completed)
            .map_err(|err| {
                PipelineError::new(PipelineStage::Generating, err.to_string())
                    .with_trace(trail.stages())
            })
    }

    /// Returns the aggregated context, or `None` when it falls below the floor.
    async fn research(&self, request: &GenerationRequest, trail: &DebugTrail) -> Option<String> {
        let topic = request.topic.trim();

        trail.enter(PipelineStage::Planning);
        let plan = self.planner.plan(topic).await;
        trail.record("generated_search_queries", &plan.queries);
        if let Some(reason) = &plan.fallback_reason {
            trail.record("query_fallback_reason", reason);
        }

        trail.enter(PipelineStage::Searching);
        let found = self.fanout.gather(&plan.queries, self.settings.url_ceiling).await;
        trail.record("raw_search_results", &found.per_query);
        trail.record("urls_to_scrape", &found.urls);

        trail.enter(PipelineStage::Scraping);
        let scraped = self
            .scrape_all(&found.urls, request.scrape_backend, trail)
            .await;

        trail.enter(PipelineStage::Filtering);
        let sources = self.filter(topic, scraped, trail).await;

        trail.enter(PipelineStage::Aggregating);
        let context = aggregate(&sources);
        let context_chars = context.chars().count();
        trail.record("research_context", &context);
        trail.record("research_context_chars", context_chars);
        tracing::info!(
            "[pipeline] {} relevant sources, {} context chars",
            sources.len(),
            context_chars
        );

        if sources.is_empty() || context_chars < self.settings.min_context_chars {
            return None;
        }
        Some(context)
    }

    /// Sequential batches; all scrapes within a batch run concurrently and
    /// are awaited together before the next batch starts.
    async fn scrape_all(
        &self,
        urls: &[String],
        backend: ScrapeBackendKind,
        trail: &DebugTrail,
    ) -> Vec<ScrapeResult> {
        let mut results = Vec::with_capacity(urls.len());
        let batch_size = self.settings.batch_size.max(1);

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            tracing::info!("[scrape] batch {} with {} urls", index + 1, batch.len());
            let settled = settle_all(batch.iter().map(|url| self.scraper.scrape(url, backend))).await;

            for (url, outcome) in batch.iter().zip(settled) {
                match outcome.into_result() {
                    Ok(result) => {
                        trail.update_page(url, scrape_fields(&result));
                        results.push(result);
                    }
                    Err(message) => {
                        tracing::error!("[scrape] task for {} panicked: {}", url, message);
                        trail.update_page(
                            url,
                            fields([("error", json!(format!("scrape task panicked: {}", message)))]),
                        );
                    }
                }
            }
        }

        let fetched = results.iter().filter(|r| r.is_success()).count();
        tracing::info!("[scrape] {}/{} pages fetched", fetched, urls.len());
        results
    }

    async fn filter(
        &self,
        topic: &str,
        scraped: Vec<ScrapeResult>,
        trail: &DebugTrail,
    ) -> Vec<SourceText> {
        let fetched: Vec<ScrapeResult> = scraped.into_iter().filter(ScrapeResult::is_success).collect();
        let settled = settle_all(fetched.iter().map(|result| self.filter_one(topic, result, trail))).await;

        let mut sources = Vec::new();
        for (result, outcome) in fetched.iter().zip(settled) {
            match outcome.into_result() {
                Ok(Some(source)) => sources.push(source),
                Ok(None) => {}
                Err(message) => {
                    tracing::error!("[filter] task for {} panicked: {}", result.url, message);
                    trail.update_page(
                        &result.url,
                        fields([
                            ("error", json!(format!("filter task panicked: {}", message))),
                            ("relevant", json!(false)),
                        ]),
                    );
                }
            }
        }
        sources
    }

    async fn filter_one(
        &self,
        topic: &str,
        result: &ScrapeResult,
        trail: &DebugTrail,
    ) -> Option<SourceText> {
        let body = result.body()?;
        let mode = self.extraction.for_backend(result.backend);
        let extracted = self.extractor.extract(body, &result.url, mode);

        let text = match extracted.outcome {
            ExtractionOutcome::Extracted { text } => text,
            ExtractionOutcome::Rejected { reason } => {
                tracing::debug!("[filter] {} rejected by extraction: {}", result.url, reason);
                trail.update_page(
                    &result.url,
                    fields([
                        ("extracted_chars", json!(0)),
                        ("extraction_error", json!(reason)),
                        ("relevant", json!(false)),
                    ]),
                );
                return None;
            }
        };

        let relevant = self.classifier.is_relevant(topic, &text).await;
        trail.update_page(
            &result.url,
            fields([
                ("extraction_mode", json!(mode.as_str())),
                ("extracted_chars", json!(text.chars().count())),
                ("relevant", json!(relevant)),
            ]),
        );

        relevant.then(|| SourceText {
            url: result.url.clone(),
            text,
        })
    }
}

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn scrape_fields(result: &ScrapeResult) -> Map<String, Value> {
    fields([
        ("backend", json!(result.backend.as_str())),
        ("user_agent", json!(result.user_agent)),
        ("raw_request", json!(result.raw_request)),
        ("raw_response", json!(result.raw_response)),
        ("error", json!(result.error())),
    ])
}

fn panic_error(trail: &DebugTrail, message: String) -> PipelineError {
    let stage = trail.current_stage().unwrap_or(PipelineStage::Planning);
    PipelineError::new(stage, format!("unexpected panic: {}", message)).with_trace(trail.stages())
}

fn fail_generation(trail: DebugTrail, error: PipelineError) -> GenerationResult {
    tracing::error!("[pipeline] {}", error);
    trail.record_critical(&error);
    trail.enter(PipelineStage::Failed);
    GenerationResult::failed(&error.message, trail.into_record())
}

fn fail_seo(trail: DebugTrail, error: PipelineError) -> SeoResult {
    tracing::error!("[pipeline] seo-only {}", error);
    trail.record_critical(&error);
    trail.enter(PipelineStage::Failed);
    SeoResult::failed(&error.message, trail.into_record())
}
