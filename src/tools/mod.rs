mod errors;
mod params;

pub use params::UniversityResearchParams;

use std::time::Duration;

use reqwest::Client;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use tracing::{info, warn};

use errors::pipeline_to_mcp_error;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::llm::GenerationError;
use crate::perplexity::PerplexityClient;
use crate::research::{
    Pipeline, PipelineError, ProgressSink, ResearchRequest, ResultSet, Researcher,
};
use crate::wikipedia::WikipediaClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout. Model calls override it per request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

/// MCP server handler exposing the university research tool.
///
/// Model backends are optional at startup; a tool call reports the missing key.
#[derive(Clone)]
pub struct UniRank {
    researcher: Option<Researcher>,
    extractor: Option<GeminiClient>,
    photos: WikipediaClient,
    default_photo: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl UniRank {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        let extractor = config
            .gemini_api_key
            .as_deref()
            .map(|key| {
                GeminiClient::new(http.clone(), key, &config.gemini_model)
                    .with_max_attempts(config.gemini_max_attempts)
            });
        let researcher = match (&config.perplexity_api_key, &extractor) {
            (Some(key), _) => Some(Researcher::Perplexity(PerplexityClient::new(
                http.clone(),
                key,
                &config.perplexity_model,
            ))),
            (None, Some(gemini)) => Some(Researcher::Gemini(gemini.clone())),
            (None, None) => None,
        };

        match &researcher {
            Some(r) => info!(backend = r.name(), "research backend configured"),
            None => warn!("no research backend: set PERPLEXITY_API_KEY or GEMINI_API_KEY"),
        }
        if extractor.is_none() {
            warn!("extraction unavailable: GEMINI_API_KEY not set");
        }

        Ok(Self {
            researcher,
            extractor,
            photos: WikipediaClient::new(http, &config.summary_base_url),
            default_photo: config.default_photo_url.clone(),
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        name = "research_universities",
        description = "Find the top universities in a country (optionally for a field of study) according to the latest QS World University Rankings. Returns JSON with name, global rank, a one-sentence description, and a photo URL for each university."
    )]
    async fn research_universities(
        &self,
        Parameters(params): Parameters<UniversityResearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = ResearchRequest::new(&params.country, params.course.as_deref())
            .ok_or_else(|| McpError::invalid_params("country must not be empty", None))?;

        info!(country = %request.country, course = ?request.course, "tool:research_universities");

        let result = self
            .research(&request, None)
            .await
            .map_err(pipeline_to_mcp_error)?;

        info!(entities = result.entities.len(), "research_universities complete");

        let output = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

impl UniRank {
    /// Runs the pipeline with the configured backends. Missing keys fail before any call.
    pub async fn research(
        &self,
        request: &ResearchRequest,
        progress: Option<&ProgressSink>,
    ) -> Result<ResultSet, PipelineError> {
        let researcher = self.researcher.as_ref().ok_or(PipelineError::Research(
            GenerationError::ApiKeyNotSet("GEMINI_API_KEY"),
        ))?;
        let extractor = self.extractor.as_ref().ok_or(PipelineError::Extraction(
            GenerationError::ApiKeyNotSet("GEMINI_API_KEY"),
        ))?;

        Pipeline {
            researcher,
            extractor,
            photos: &self.photos,
            default_photo: &self.default_photo,
        }
        .run(request, progress)
        .await
    }
}

#[tool_handler]
impl ServerHandler for UniRank {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "unirank".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "unirank researches the top-ranked universities in a country with a search-grounded model, extracts them as structured records, and attaches a Wikipedia photo to each."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
