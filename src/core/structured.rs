use crate::utils::error::{GptApiError, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldType {
    fn from_schema(details: &Value) -> Self {
        match details.get("type").and_then(Value::as_str) {
            Some("number") => FieldType::Number,
            Some("integer") => FieldType::Integer,
            Some("boolean") => FieldType::Boolean,
            Some("object") => FieldType::Object,
            Some("array") => FieldType::Array,
            Some("null") => FieldType::Null,
            _ => FieldType::String,
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
            FieldType::Null => value.is_null(),
        }
    }
}

/// Output model derived from a structured-output JSON schema. Every property
/// in the schema is required. Properties whose `type` is missing or not a
/// single JSON type name are treated as strings.
#[derive(Debug, Clone)]
pub struct StructuredOutputModel {
    fields: Vec<(String, FieldType)>,
}

impl StructuredOutputModel {
    pub fn from_schema(schema: &Value) -> Result<Self> {
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| GptApiError::StructuredOutput {
                message: "schema has no 'properties' object".to_string(),
            })?;

        let fields = properties
            .iter()
            .map(|(name, details)| (name.clone(), FieldType::from_schema(details)))
            .collect();

        Ok(Self { fields })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn validate(&self, arguments: &str) -> Result<Map<String, Value>> {
        let value: Value =
            serde_json::from_str(arguments).map_err(|e| GptApiError::StructuredOutput {
                message: format!("arguments are not valid JSON: {}", e),
            })?;

        let Value::Object(object) = value else {
            return Err(GptApiError::StructuredOutput {
                message: "arguments must be a JSON object".to_string(),
            });
        };

        for (name, field_type) in &self.fields {
            match object.get(name) {
                None => {
                    return Err(GptApiError::StructuredOutput {
                        message: format!("field '{}' is required", name),
                    })
                }
                Some(value) if !field_type.matches(value) => {
                    return Err(GptApiError::StructuredOutput {
                        message: format!("field '{}' should be of type {:?}", name, field_type),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(object)
    }
}
