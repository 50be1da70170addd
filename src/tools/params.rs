use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Deserialize, JsonSchema)]
pub struct UniversityResearchParams {
    /// The country to research universities in (e.g., "Canada")
    pub country: String,
    /// The course or field of study to focus on (e.g., "Computer Science")
    pub course: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_is_optional() {
        let params: UniversityResearchParams =
            serde_json::from_str(r#"{"country": "Canada"}"#).unwrap();
        assert_eq!(params.country, "Canada");
        assert!(params.course.is_none());
    }

    #[test]
    fn country_is_required() {
        assert!(serde_json::from_str::<UniversityResearchParams>(r#"{"course": "Law"}"#).is_err());
    }
}
