use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Guidance the model sees for a single record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    /// English name also accepted on input.
    pub alias: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

/// Structured incident report extracted from a textual description.
///
/// Every field is independently nullable; an all-`None` record is valid.
///
/// Deserializing an object that carries both a key and its alias fails with a
/// duplicate-field error; model replies go through
/// [`OutputNormalizer::parse`](crate::OutputNormalizer::parse), which folds
/// aliases first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(rename = "data_ocorrencia", alias = "occurrence_time", default)]
    pub occurrence_time: Option<String>,
    #[serde(rename = "local", alias = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "tipo_incidente", alias = "incident_type", default)]
    pub incident_type: Option<String>,
    #[serde(rename = "impacto", alias = "impact", default)]
    pub impact: Option<String>,
}

impl ExtractionRecord {
    /// Field metadata in wire order.
    pub const FIELDS: [FieldSpec; 4] = [
        FieldSpec {
            key: "data_ocorrencia",
            alias: "occurrence_time",
            description: "Date and time of incident occurrence in ISO 8601 format (YYYY-MM-DD HH:MM). \
                Handle relative times like 'ontem' (yesterday) or 'há 2 horas' by calculating absolute \
                datetime based on current context. Always use 24-hour format.",
            examples: &[
                "2025-08-12 14:00",
                "2023-11-05 09:30",
                "2024-01-01 23:45",
                "2021-08-30",
            ],
        },
        FieldSpec {
            key: "local",
            alias: "location",
            description: "Geographical location or physical facility where incident occurred. \
                Extract city names, office references, or facility identifiers. Use canonical names \
                when possible.",
            examples: &[
                "São Paulo",
                "New York",
                "Datacenter Leste",
                "Escritório Principal",
            ],
        },
        FieldSpec {
            key: "tipo_incidente",
            alias: "incident_type",
            description: "Category classification of the incident. Use concise technical \
                descriptions while maintaining original context from input text.",
            examples: &[
                "Falha no servidor",
                "Service unavailable",
                "Corte de fibra ótica",
                "Interrupção de energia",
                "Erro de configuração",
            ],
        },
        FieldSpec {
            key: "impacto",
            alias: "impact",
            description: "Brief description of affected systems and duration. Preserve key details \
                about scope and time impact while using concise language.",
            examples: &[
                "Sistema de faturamento indisponível por 2 horas",
                "Latência aumentada em serviços web por 45 minutos",
                "Perda parcial de dados de monitoramento",
            ],
        },
    ];

    /// JSON schema handed to the model host as the structured output format.
    pub fn json_schema() -> Value {
        let mut properties = Map::new();
        for field in Self::FIELDS {
            properties.insert(
                field.key.to_string(),
                json!({
                    "type": ["string", "null"],
                    "description": field.description,
                    "examples": field.examples,
                }),
            );
        }

        let required: Vec<&str> = Self::FIELDS.iter().map(|f| f.key).collect();

        json!({
            "title": "EndpointIncidentReportOutput",
            "description": "Structured incident report extracted from textual descriptions",
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }

    pub fn populated_fields(&self) -> usize {
        [
            &self.occurrence_time,
            &self.location,
            &self.incident_type,
            &self.impact,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_wire_keys() {
        let record = ExtractionRecord {
            location: Some("Datacenter Leste".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["local"], "Datacenter Leste");
        assert!(value["data_ocorrencia"].is_null());
        assert!(value["tipo_incidente"].is_null());
        assert!(value["impacto"].is_null());
        assert!(value.get("location").is_none());
    }

    #[test]
    fn test_accepts_english_aliases() {
        let record: ExtractionRecord = serde_json::from_str(
            r#"{"occurrence_time": "2025-08-12 14:00", "location": "New York"}"#,
        )
        .unwrap();

        assert_eq!(record.occurrence_time.as_deref(), Some("2025-08-12 14:00"));
        assert_eq!(record.location.as_deref(), Some("New York"));
        assert_eq!(record.incident_type, None);
        assert_eq!(record.populated_fields(), 2);
    }

    #[test]
    fn test_empty_record_is_valid() {
        let record: ExtractionRecord = serde_json::from_str("{}").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_schema_lists_every_field_as_nullable_string() {
        let schema = ExtractionRecord::json_schema();
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(properties.len(), 4);
        for field in ExtractionRecord::FIELDS {
            let prop = &properties[field.key];
            assert_eq!(prop["type"], json!(["string", "null"]));
            assert!(!prop["examples"].as_array().unwrap().is_empty());
        }
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }
}
