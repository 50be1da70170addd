use tracing::{debug, info, warn};

use super::enrich::enrich_photos;
use super::entity::{ResearchRequest, ResultSet};
use super::extract::{university_array_schema, validate_entities};
use super::progress::{ProgressEvent, ProgressSink, emit};
use super::prompt::{extraction_prompt, research_prompt};
use crate::llm::{GenerationError, StructuredGenerator, TextGenerator};
use crate::wikipedia::PhotoLookup;

const STATUS_MESSAGE: &str = "Researching universities...";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("research failed: {0}")]
    Research(#[source] GenerationError),

    #[error("extraction failed: {0}")]
    Extraction(#[source] GenerationError),

    #[error("extraction output failed schema validation: {0}")]
    SchemaValidation(String),
}

impl PipelineError {
    pub fn generation(&self) -> Option<&GenerationError> {
        match self {
            PipelineError::Research(e) | PipelineError::Extraction(e) => Some(e),
            PipelineError::SchemaValidation(_) => None,
        }
    }
}

/// The capabilities one pipeline run depends on.
pub struct Pipeline<'a, R, S, L> {
    pub researcher: &'a R,
    pub extractor: &'a S,
    pub photos: &'a L,
    pub default_photo: &'a str,
}

impl<R, S, L> Pipeline<'_, R, S, L>
where
    R: TextGenerator,
    S: StructuredGenerator,
    L: PhotoLookup,
{
    /// Research, extract, then enrich. Any generation or validation failure
    /// aborts the run; photo lookups never do.
    pub async fn run(
        &self,
        request: &ResearchRequest,
        progress: Option<&ProgressSink>,
    ) -> Result<ResultSet, PipelineError> {
        let prompt = research_prompt(request);

        emit(
            progress,
            ProgressEvent::Status {
                content: STATUS_MESSAGE.to_string(),
            },
        );

        let narrative = self
            .researcher
            .generate_text(&prompt)
            .await
            .inspect_err(|e| warn!(error = %e, "research stage failed"))
            .map_err(PipelineError::Research)?;
        debug!(bytes = narrative.len(), "research narrative received");

        let raw = self
            .extractor
            .generate_json(&extraction_prompt(&narrative), &university_array_schema())
            .await
            .inspect_err(|e| warn!(error = %e, "extraction stage failed"))
            .map_err(PipelineError::Extraction)?;

        let entities = validate_entities(raw)
            .inspect_err(|e| warn!(error = %e, "extraction output rejected"))
            .map_err(PipelineError::SchemaValidation)?;
        info!(entities = entities.len(), "universities extracted");

        let entities = enrich_photos(self.photos, entities, self.default_photo).await;
        Ok(ResultSet { entities })
    }
}
