use rmcp::ErrorData as McpError;

use crate::llm::GenerationError;
use crate::research::PipelineError;

pub(super) fn retriable_error(e: &impl std::fmt::Display) -> McpError {
    McpError::internal_error(format!("{e} (retriable)"), None)
}

pub(super) fn pipeline_to_mcp_error(e: PipelineError) -> McpError {
    match e.generation() {
        Some(GenerationError::ApiKeyNotSet(var)) => McpError::invalid_params(
            format!("{e} (set {var} in the server environment)"),
            None,
        ),
        Some(GenerationError::RateLimited) => retriable_error(&e),
        Some(GenerationError::QuotaExhausted(_)) => McpError::invalid_params(
            format!("{e} (check the API billing for this provider)"),
            None,
        ),
        _ => McpError::internal_error(e.to_string(), None),
    }
}
