use super::utils::TextGenerator;
use crate::error::{AnalysisError, Result};
use crate::models::{AnalysisOptions, AnalysisRecord};
use serde_json::Value;
use tracing::{error, info};

const RECORD_SCHEMA: &str = r#"{
    "title": "Paper Title",
    "authors": ["Author 1", "Author 2"],
    "publication_year": "Year",
    "journal": "Journal Name",
    "keywords": ["Keyword 1", "Keyword 2"],
    "main_subject": "One sentence summary",
    "abstract_summary": "Summary text...",
    "introduction_summary": "Summary text...",
    "objective_hypotheses": "Objective text...",
    "methodology_summary": "Methods text...",
    "results_summary": "Key findings text...",
    "discussion_summary": "Discussion text...",
    "main_conclusions": ["Conclusion 1", "Conclusion 2"]
}"#;

/// Instruction sent to the model: directives, the exact output schema, then
/// the paper text.
pub fn build_prompt(full_text: &str, options: AnalysisOptions) -> String {
    format!(
        "As an expert academic researcher, analyze the provided scientific paper text and generate a comprehensive summary in valid JSON format.

**Configuration:**
- **Detail Level:** {detail_level}
- **Target Audience:** {target_audience}

Respond with ONLY a single JSON object matching the structure below. \
Do not include Markdown formatting such as ```json fences, and do not add any commentary before or after the JSON.
Use null for any field that cannot be determined from the paper.

Required JSON Structure:
{schema}

Paper Text:
{full_text}
",
        detail_level = options.detail_level,
        target_audience = options.target_audience,
        schema = RECORD_SCHEMA,
        full_text = full_text,
    )
}

/// Strictly parse a model reply. The reply must be one non-empty JSON object
/// using only the record's keys, each with the expected type; there is no
/// fence stripping, unwrapping or partial recovery.
pub fn parse_analysis_record(reply: &str) -> Result<AnalysisRecord> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| AnalysisError::Generation(format!("reply is not valid JSON: {}", e)))?;

    match &value {
        Value::Object(fields) if fields.is_empty() => {
            return Err(AnalysisError::Generation(
                "reply contains none of the expected fields".to_string(),
            ));
        }
        Value::Object(_) => {}
        _ => {
            return Err(AnalysisError::Generation(
                "reply is valid JSON but not an object".to_string(),
            ));
        }
    }

    serde_json::from_value(value).map_err(|e| {
        AnalysisError::Generation(format!("reply does not match the expected structure: {}", e))
    })
}

/// Build the prompt, call the generator once, and parse its reply.
pub async fn request_summary(
    generator: &dyn TextGenerator,
    full_text: &str,
    options: AnalysisOptions,
) -> Result<AnalysisRecord> {
    info!(
        "Requesting summary (detail: {}, audience: {}, {} characters of text)",
        options.detail_level,
        options.target_audience,
        full_text.len()
    );

    let prompt = build_prompt(full_text, options);

    let reply = generator.generate_json(&prompt).await.map_err(|e| {
        error!("Summary request failed: {}", e);
        AnalysisError::Generation(e.to_string())
    })?;

    let record = parse_analysis_record(&reply).inspect_err(|e| {
        error!("Rejected model reply: {}", e);
    })?;

    info!(
        "Summary parsed: {:?} ({} conclusions)",
        record.title.as_deref().unwrap_or("untitled"),
        record.main_conclusions.as_ref().map_or(0, Vec::len)
    );
    Ok(record)
}
