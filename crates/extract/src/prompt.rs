use crate::schema::ExtractionRecord;
use chrono::{DateTime, Local};

pub const AGENT_NAME: &str = "Incident Data Extractor";

pub const AGENT_ROLE: &str =
    "Specialized in extracting structured incident information from unstructured text";

pub const AGENT_DESCRIPTION: &str = "Expert at parsing incident reports to identify and extract key \
    information including timestamps, locations, incident types, and impact descriptions with high accuracy";

pub const SUCCESS_CRITERIA: &str =
    "Achieving JSON compliance with the defined response model structure";

pub const INSTRUCTIONS: [&str; 11] = [
    "Carefully analyze the input text to identify all relevant incident information",
    "Extract date/time information and convert to standardized ISO format (YYYY-MM-DD HH:MM)",
    "Handle relative time references (e.g., 'ontem', 'há 2 horas') by calculating absolute timestamps",
    "Identify geographical locations, office names, or facility references for the 'local' field",
    "Classify incident types using consistent terminology from the provided examples",
    "Summarize impact descriptions concisely while preserving key details about affected systems and duration",
    "Maintain the original language of the input text in all output fields",
    "If information for a field is not present in the text, return null for that field",
    "Ensure all extracted information accurately reflects what is stated in the input text",
    "Ensure all extracted information accurately matched the language in the input text",
    "Output must strictly conform to the JSON schema defined by EndpointIncidentReportOutput",
];

/// Builds the system message for one extraction call.
///
/// `now` anchors relative time expressions such as "ontem" or "há 2 horas".
pub fn build_system_prompt(now: DateTime<Local>) -> String {
    let instructions = INSTRUCTIONS
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n");

    let schema = serde_json::to_string_pretty(&ExtractionRecord::json_schema())
        .unwrap_or_else(|_| ExtractionRecord::json_schema().to_string());

    format!(
        r#"You are {name}. {description}

ROLE:
{role}

INSTRUCTIONS:
{instructions}

SUCCESS CRITERIA:
{criteria}

CURRENT DATE AND TIME:
{now}

SCHEMA:
{schema}

Respond with a single JSON object that matches the schema above. No markdown, no code blocks, no explanations."#,
        name = AGENT_NAME,
        description = AGENT_DESCRIPTION,
        role = AGENT_ROLE,
        instructions = instructions,
        criteria = SUCCESS_CRITERIA,
        now = now.format("%Y-%m-%d %H:%M:%S %:z"),
        schema = schema,
    )
}
