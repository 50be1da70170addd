//! University research pipeline: grounded research, structured extraction, photo enrichment.

mod enrich;
mod entity;
mod extract;
mod pipeline;
mod progress;
mod prompt;

pub use entity::{ResearchRequest, ResultSet};
pub use pipeline::{Pipeline, PipelineError};
pub use progress::{ProgressEvent, ProgressSink};

use crate::gemini::GeminiClient;
use crate::llm::{GenerationError, TextGenerator};
use crate::perplexity::PerplexityClient;

/// Backend used for the research stage.
#[derive(Clone, Debug)]
pub enum Researcher {
    Gemini(GeminiClient),
    Perplexity(PerplexityClient),
}

impl Researcher {
    pub fn name(&self) -> &'static str {
        match self {
            Researcher::Gemini(_) => "gemini",
            Researcher::Perplexity(_) => "perplexity",
        }
    }
}

impl TextGenerator for Researcher {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        match self {
            Researcher::Gemini(client) => client.generate_text(prompt).await,
            Researcher::Perplexity(client) => client.generate_text(prompt).await,
        }
    }
}
