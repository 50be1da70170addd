use serde::{Deserialize, Serialize};

/// Arguments of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRequest {
    pub country: String,
    pub course: Option<String>,
}

impl ResearchRequest {
    /// Trims both fields; `None` when the country is blank. A blank course is dropped.
    pub fn new(country: &str, course: Option<&str>) -> Option<Self> {
        let country = country.trim();
        if country.is_empty() {
            return None;
        }
        Some(Self {
            country: country.to_string(),
            course: course
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        })
    }
}

/// One ranked university. `photo` holds the model's placeholder until enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityEntity {
    pub name: String,
    pub rank: u32,
    pub description: String,
    pub photo: String,
}

/// Final pipeline output, in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub entities: Vec<UniversityEntity>,
}
