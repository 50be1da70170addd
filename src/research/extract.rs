use serde_json::json;

use super::entity::UniversityEntity;

/// Response schema for the extraction model (Gemini's OpenAPI subset).
pub fn university_array_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": {
                    "type": "STRING",
                    "description": "The name of the university"
                },
                "rank": {
                    "type": "INTEGER",
                    "description": "The global rank of the university"
                },
                "description": {
                    "type": "STRING",
                    "description": "A short description of the university"
                },
                "photo": {
                    "type": "STRING",
                    "description": "Link for the college logo"
                }
            },
            "required": ["name", "rank", "description", "photo"],
            "propertyOrdering": ["name", "rank", "description", "photo"]
        }
    })
}

/// Strictly decodes the model output. Any type mismatch, missing field, or zero
/// rank rejects the whole batch.
pub fn validate_entities(value: serde_json::Value) -> Result<Vec<UniversityEntity>, String> {
    let entities: Vec<UniversityEntity> =
        serde_json::from_value(value).map_err(|e| e.to_string())?;

    if let Some((i, _)) = entities.iter().enumerate().find(|(_, e)| e.rank == 0) {
        return Err(format!("entity {i}: rank must be a positive integer"));
    }

    Ok(entities)
}
