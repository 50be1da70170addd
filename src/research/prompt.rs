use super::entity::ResearchRequest;

const RESULT_COUNT: usize = 5;

/// Research prompt for the search-grounded model.
pub fn research_prompt(request: &ResearchRequest) -> String {
    let scope = match &request.course {
        Some(course) => format!("{} for {course}", request.country),
        None => request.country.clone(),
    };
    format!(
        "List the top {RESULT_COUNT} universities in {scope} according to the latest edition of the QS World University Rankings. For each, provide:\n\
         - Name\n\
         - Global rank (according to the QS World University Rankings)\n\
         - A short description (1 sentence)\n\
         - An approximate reputation score as a percentage (if available)\n\
         Format as a readable list."
    )
}

/// Extraction prompt wrapping the research narrative.
pub fn extraction_prompt(narrative: &str) -> String {
    format!("Generate the json object for universities from the given info {narrative}")
}
