use thiserror::Error;

/// Errors surfaced by an enrichment run.
///
/// Every variant is fatal to the run it occurs in: nothing is retried and
/// no partial note is ever posted. The variant tells you which collaborator
/// (or which invariant) failed.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Configuration is missing or inconsistent (e.g. a required credential).
    #[error("invalid enrichment config: {0}")]
    Config(String),

    /// The embedding provider errored or returned an unusable response.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The provider's vector does not match the dimension the index was
    /// populated with. Searching anyway would return garbage, so the run
    /// fails before retrieval.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The similarity index errored. An empty result list is NOT this;
    /// zero hits is a valid outcome handled by the fallback note.
    #[error("similarity search failed: {0}")]
    Search(String),

    /// The language generator errored at the transport or API level.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The generator answered but produced no candidates or an empty
    /// candidate. Posting an empty triage note would be worse than posting
    /// nothing.
    #[error("generator returned no usable text: {0}")]
    EmptyGeneration(String),

    /// The incident store rejected the note append.
    #[error("note delivery failed: {0}")]
    NoteDelivery(String),
}
