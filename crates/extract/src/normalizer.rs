use crate::error::WorkflowError;
use crate::schema::ExtractionRecord;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<think>.*?</think>").expect("valid think regex"));

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\n?(.*?)\n?\s*```").expect("valid fence regex")
});

/// Values models write when they mean "not present".
const NULL_PLACEHOLDERS: [&str; 3] = ["null", "none", "n/a"];

/// Turns raw model content into an [`ExtractionRecord`].
pub struct OutputNormalizer;

impl OutputNormalizer {
    /// Strip reasoning blocks and the first markdown fence around the JSON payload.
    pub fn strip_wrapping(raw: &str) -> &str {
        let without_think = match THINK_BLOCK.find(raw) {
            Some(m) => &raw[m.end()..],
            None => raw,
        };

        match CODE_FENCE.captures(without_think) {
            Some(caps) => caps.get(1).map_or(without_think, |m| m.as_str()).trim(),
            None => without_think.trim(),
        }
    }

    /// Parse model content, rejecting anything that is not a JSON object of
    /// nullable strings.
    pub fn parse(raw: &str) -> Result<ExtractionRecord, WorkflowError> {
        let payload = Self::strip_wrapping(raw);

        let mut value = parse_json(payload)?;

        if !value.is_object() {
            return Err(WorkflowError::MalformedOutput(format!(
                "expected a JSON object, got {}",
                kind(&value)
            )));
        }
        if let Some(object) = value.as_object_mut() {
            fold_aliases(object);
        }

        let record: ExtractionRecord = serde_json::from_value(value)
            .map_err(|e| WorkflowError::MalformedOutput(e.to_string()))?;

        Ok(Self::clean(record))
    }

    /// Trim every field and collapse blanks and placeholders to `None`.
    pub fn clean(record: ExtractionRecord) -> ExtractionRecord {
        ExtractionRecord {
            occurrence_time: clean_field(record.occurrence_time),
            location: clean_field(record.location),
            incident_type: clean_field(record.incident_type),
            impact: clean_field(record.impact),
        }
    }
}

/// Whole payload first, then the outermost `{...}` span for replies with prose around it.
fn parse_json(payload: &str) -> Result<Value, WorkflowError> {
    let err = match serde_json::from_str::<Value>(payload) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (payload.find('{'), payload.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&payload[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(WorkflowError::MalformedOutput(format!("not valid JSON: {}", err)))
}

/// Keep one value per field when the reply carries both a key and its alias,
/// preferring whichever is non-null and the wire key on a tie.
fn fold_aliases(object: &mut Map<String, Value>) {
    for field in ExtractionRecord::FIELDS {
        let Some(alias_value) = object.remove(field.alias) else {
            continue;
        };

        let keep_wire = object.get(field.key).is_some_and(|v| !v.is_null());
        if !keep_wire {
            object.insert(field.key.to_string(), alias_value);
        }
    }
}

fn clean_field(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if NULL_PLACEHOLDERS.contains(&lowered.as_str()) {
        return None;
    }

    Some(trimmed.to_string())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
