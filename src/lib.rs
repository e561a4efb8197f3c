//! Incident-alert enrichment service.
//!
//! When an incident fires, this service turns the alert into a triage note:
//! embed the alert text, pull the closest historical incidents out of a
//! vector collection, ask a generative model what the on-call should do
//! about it, and append the result to the incident's timeline.
//!
//! The moving parts:
//!
//! - **Intake** (`server`, feature-gated) - axum webhook endpoint. Parses,
//!   filters, acknowledges, and gets out of the way.
//! - **Pipeline** - the strict embed, search, generate, post sequence,
//!   one detached run per accepted event. Any collaborator failure aborts
//!   the run; nothing is retried and no partial note is ever posted.
//! - **Collaborators** - four trait seams ([`EmbeddingProvider`],
//!   [`SimilarityIndex`], [`TextGenerator`], [`IncidentStore`]) with REST
//!   adapters behind them. Tests swap in recording fakes.
//!
//! Zero retrieval hits is not a failure: a fixed fallback note is posted
//! and the generator never runs. Re-running an incident appends a second,
//! independent note; there is no deduplication.
//!
//! # Quick example
//!
//! ```no_run
//! use incident_enrich::{EnrichConfig, EnrichmentPipeline, IncidentInput, Urgency};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = EnrichConfig::load()?;
//!     cfg.validate()?;
//!
//!     let pipeline = Arc::new(EnrichmentPipeline::from_config(&cfg)?);
//!     let outcome = pipeline
//!         .enrich(IncidentInput {
//!             id: "PABC123".into(),
//!             title: "DB pool exhausted".into(),
//!             description: "connection pool saturated on primary".into(),
//!             service_name: "payments-api".into(),
//!             urgency: Urgency::High,
//!         })
//!         .await?;
//!
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod incident;
pub mod note;
pub mod pipeline;
pub mod search;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

pub use crate::config::EnrichConfig;
pub use crate::embedding::{EmbeddingIntent, EmbeddingProvider, GeminiEmbeddings};
pub use crate::error::EnrichError;
pub use crate::generate::{GeminiGenerator, SamplingConfig, TextGenerator};
pub use crate::incident::{IncidentInput, SimilarIncident, Urgency, WebhookPayload};
pub use crate::note::{FALLBACK_NOTE, build_prompt, format_note};
pub use crate::pipeline::{EnrichOptions, EnrichOutcome, EnrichmentPipeline};
pub use crate::search::{QdrantSearch, SimilarityIndex};
pub use crate::store::{IncidentStore, PagerDutyNotes};

#[cfg(feature = "server")]
pub use crate::server::{IntakeConfig, start_server};
