//! The enrichment pipeline: one incident in, one posted triage note out.
//!
//! Steps run in strict order (embed, search, conditionally generate,
//! format, post) and any collaborator failure aborts the run without
//! posting anything. Zero retrieval hits is not a failure: the fixed
//! fallback note is posted and the generator is never consulted.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::EnrichConfig;
use crate::embedding::{EmbeddingIntent, EmbeddingProvider, GeminiEmbeddings};
use crate::error::EnrichError;
use crate::generate::{GeminiGenerator, SamplingConfig, TextGenerator};
use crate::incident::IncidentInput;
use crate::note::{FALLBACK_NOTE, build_prompt, format_note};
use crate::search::{QdrantSearch, SimilarityIndex};
use crate::store::{IncidentStore, PagerDutyNotes};

/// How far one run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// A generated note was posted, built from `matches` retrieved hits.
    Enriched { matches: usize },
    /// Retrieval came back empty; the fallback note was posted instead.
    NoMatches,
}

/// Knobs the pipeline itself owns (the collaborators carry their own).
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Number of nearest neighbours requested per query.
    pub top_k: usize,
    /// Dimensionality the similarity collection was populated with; any
    /// embedding of a different length fails the run before search.
    pub embedding_dim: usize,
    /// Sampling settings passed to the generator on every call.
    pub sampling: SamplingConfig,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            embedding_dim: 3072,
            sampling: SamplingConfig::default(),
        }
    }
}

/// Orchestrates the four collaborators for one incident at a time.
///
/// Each run owns its incident, vector, and hit list; concurrent runs share
/// nothing but the (internally synchronized) collaborator clients, so no
/// locking is needed anywhere in here.
pub struct EnrichmentPipeline {
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn IncidentStore>,
    options: EnrichOptions,
}

impl EnrichmentPipeline {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn IncidentStore>,
        options: EnrichOptions,
    ) -> Self {
        Self {
            embeddings,
            index,
            generator,
            store,
            options,
        }
    }

    /// Wire up the production collaborators from configuration. One pooled
    /// HTTP client, bounded by the configured timeout, is shared across all
    /// four.
    pub fn from_config(cfg: &EnrichConfig) -> Result<Self, EnrichError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .connect_timeout(cfg.request_timeout().min(std::time::Duration::from_secs(10)))
            .build()
            .map_err(|err| EnrichError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self::new(
            Arc::new(GeminiEmbeddings::new(client.clone(), cfg)),
            Arc::new(QdrantSearch::new(client.clone(), cfg)),
            Arc::new(GeminiGenerator::new(client.clone(), cfg)),
            Arc::new(PagerDutyNotes::new(client, cfg)),
            EnrichOptions {
                embedding_dim: cfg.embedding_dim,
                ..EnrichOptions::default()
            },
        ))
    }

    /// Run the full pipeline for one incident.
    pub async fn enrich(&self, incident: IncidentInput) -> Result<EnrichOutcome, EnrichError> {
        let query = format!("{} {}", incident.title, incident.description);

        let vector = self.embeddings.embed(&query, EmbeddingIntent::Query).await?;
        if vector.len() != self.options.embedding_dim {
            return Err(EnrichError::DimensionMismatch {
                expected: self.options.embedding_dim,
                actual: vector.len(),
            });
        }

        let hits = self.index.search(&vector, self.options.top_k).await?;

        if hits.is_empty() {
            tracing::info!(incident_id = %incident.id, "no similar incidents found");
            self.store.append_note(&incident.id, FALLBACK_NOTE).await?;
            return Ok(EnrichOutcome::NoMatches);
        }

        let prompt = build_prompt(&incident, &hits);
        let generated = self.generator.generate(&prompt, &self.options.sampling).await?;

        let note = format_note(&generated, &hits);
        self.store.append_note(&incident.id, &note).await?;

        Ok(EnrichOutcome::Enriched { matches: hits.len() })
    }

    /// Launch one detached run. The intake layer drops the handle
    /// (fire-and-forget); tests await it for deterministic completion.
    pub fn spawn(self: &Arc<Self>, incident: IncidentInput) -> JoinHandle<Result<EnrichOutcome, EnrichError>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let incident_id = incident.id.clone();
            tracing::info!(incident_id = %incident_id, title = %incident.title, "enrichment run started");

            let result = pipeline.enrich(incident).await;
            match &result {
                Ok(EnrichOutcome::Enriched { matches }) => {
                    tracing::info!(incident_id = %incident_id, matches, "incident enriched");
                }
                Ok(EnrichOutcome::NoMatches) => {
                    tracing::info!(incident_id = %incident_id, "fallback note posted");
                }
                Err(err) => {
                    tracing::error!(incident_id = %incident_id, error = %err, "enrichment run failed");
                }
            }
            result
        })
    }
}
