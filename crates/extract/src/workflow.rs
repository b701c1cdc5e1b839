use crate::config::ModelConfig;
use crate::error::{ConfigError, WorkflowError};
use crate::llm::{ChatBackend, ChatMessage, ChatRequest, OllamaClient};
use crate::normalizer::OutputNormalizer;
use crate::prompt;
use crate::schema::ExtractionRecord;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A successful extraction: the validated record plus the model's raw reply.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ExtractionRecord,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform response body for one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

impl From<&Result<Extraction, WorkflowError>> for Envelope {
    fn from(result: &Result<Extraction, WorkflowError>) -> Self {
        match result {
            Ok(extraction) => match serde_json::to_string(&extraction.record) {
                Ok(json) => Envelope::success(json),
                // Unreachable for a struct of strings; keep the raw reply
                Err(_) => Envelope::success(extraction.raw.clone()),
            },
            Err(e) => Envelope::error(e.to_string()),
        }
    }
}

impl From<Result<Extraction, WorkflowError>> for Envelope {
    fn from(result: Result<Extraction, WorkflowError>) -> Self {
        Envelope::from(&result)
    }
}

/// Turns free-form incident text into an [`ExtractionRecord`] through one model call.
///
/// Built once at startup and shared read-only between requests.
pub struct IncidentWorkflow {
    backend: Arc<dyn ChatBackend>,
}

impl IncidentWorkflow {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Validate the model settings and connect an [`OllamaClient`].
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint()?;
        let client = OllamaClient::new(&endpoint)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn backend(&self) -> String {
        self.backend.describe()
    }

    pub async fn extract(&self, text: &str) -> Result<Extraction, WorkflowError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(prompt::build_system_prompt(Local::now())),
                ChatMessage::user(text),
            ],
            format: Some(ExtractionRecord::json_schema()),
        };

        debug!(%request_id, input_chars = text.chars().count(), "Sending extraction request");

        let outcome = match self.backend.chat(&request).await {
            Ok(raw) => OutputNormalizer::parse(&raw).map(|record| Extraction { record, raw }),
            Err(e) => Err(e.into()),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(extraction) => info!(
                %request_id,
                elapsed_ms,
                populated_fields = extraction.record.populated_fields(),
                "Incident extracted"
            ),
            Err(e) => warn!(%request_id, elapsed_ms, error = %e, "Incident extraction failed"),
        }

        outcome
    }

    /// Never fails: every error is folded into an error envelope.
    pub async fn process(&self, text: &str) -> Envelope {
        Envelope::from(self.extract(text).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that replays a fixed reply and remembers what it was asked.
    struct ScriptedBackend {
        reply: fn() -> Result<String, LlmError>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedBackend {
        fn new(reply: fn() -> Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            (self.reply)()
        }
    }

    const OUTAGE_TEXT: &str = "Houve uma queda de energia no Datacenter Leste ontem à noite, \
        afetando o faturamento por 2 horas.";

    fn outage_reply() -> Result<String, LlmError> {
        Ok(r#"{"data_ocorrencia": "2025-08-11 21:00", "local": "Datacenter Leste",
               "tipo_incidente": "Falha de energia",
               "impacto": "Sistema de faturamento indisponível por 2 horas"}"#
            .to_string())
    }

    #[tokio::test]
    async fn test_outage_report_success() {
        let backend = ScriptedBackend::new(outage_reply);
        let workflow = IncidentWorkflow::new(backend.clone());

        let envelope = workflow.process(OUTAGE_TEXT).await;
        assert_eq!(envelope.status, Status::Success);

        let record: ExtractionRecord = serde_json::from_str(&envelope.message).unwrap();
        assert_eq!(record.location.as_deref(), Some("Datacenter Leste"));
        assert_eq!(record.incident_type.as_deref(), Some("Falha de energia"));
        assert!(record.impact.unwrap().contains("2 horas"));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages.len(), 2);
        assert_eq!(seen[0].messages[1].content, OUTAGE_TEXT);
        assert!(seen[0].messages[0].content.contains("CURRENT DATE AND TIME"));
        assert!(seen[0].format.is_some());
    }

    #[tokio::test]
    async fn test_missing_location_is_null() {
        let backend = ScriptedBackend::new(|| {
            Ok(r#"{"data_ocorrencia": "2025-08-12 12:00", "local": null,
                   "tipo_incidente": "Service unavailable", "impacto": "API fora do ar por 45 minutos"}"#
                .to_string())
        });
        let workflow = IncidentWorkflow::new(backend);

        let extraction = workflow
            .extract("A API ficou fora do ar por 45 minutos hoje ao meio-dia.")
            .await
            .unwrap();

        assert_eq!(extraction.record.location, None);
        assert_eq!(extraction.record.populated_fields(), 3);

        let envelope = Envelope::from(Ok::<_, WorkflowError>(extraction));
        let value: serde_json::Value = serde_json::from_str(&envelope.message).unwrap();
        assert!(value["local"].is_null());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_envelope() {
        let backend = ScriptedBackend::new(|| Err(LlmError::Transport("connection refused".to_string())));
        let workflow = IncidentWorkflow::new(backend);

        let envelope = workflow.process("qualquer texto").await;
        assert_eq!(envelope.status, Status::Error);
        assert!(envelope.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_output_becomes_error_envelope() {
        let backend = ScriptedBackend::new(|| Ok("Desculpe, não entendi.".to_string()));
        let workflow = IncidentWorkflow::new(backend);

        let envelope = workflow.process("texto").await;
        assert_eq!(envelope.status, Status::Error);
        assert!(envelope.message.starts_with("malformed model output"));
    }

    #[tokio::test]
    async fn test_empty_input_still_yields_envelope() {
        let backend = ScriptedBackend::new(|| Ok("{}".to_string()));
        let workflow = IncidentWorkflow::new(backend);

        let envelope = workflow.process("").await;
        assert_eq!(envelope.status, Status::Success);
        assert!(!envelope.message.is_empty());
    }

    #[test]
    fn test_envelope_wire_shape() {
        let value = serde_json::to_value(Envelope::error("boom")).unwrap();
        assert_eq!(value, serde_json::json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn test_from_config_rejects_bad_port() {
        let config = ModelConfig {
            port: 70000,
            ..Default::default()
        };
        assert!(matches!(
            IncidentWorkflow::from_config(&config),
            Err(ConfigError::PortOutOfRange(70000))
        ));
    }
}
