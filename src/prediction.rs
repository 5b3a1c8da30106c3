//! Boundary to the external maintenance-prediction service.
//!
//! The service itself is a black box behind [`PredictionTransport`]: it receives one machine
//! rendered as plain text and answers with a JSON verdict, possibly wrapped in a fenced code
//! block. This module renders the request, strips the fence, and parses the answer into a
//! [`PredictionVerdict`]. Anything malformed or incomplete is a [`PredictionError`], never a
//! partial verdict.
//!
//! Requests are one-at-a-time per selection. [`SelectionGuard`] lets the caller drop a response
//! whose originating selection has been superseded.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::schema::FIELD_SCHEMA;
use crate::types::MachineRecord;

/// Errors from the prediction boundary. All of them are retryable by re-selecting the machine.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("prediction service returned an empty response")]
    EmptyResponse,

    #[error("failed to parse the JSON response from the prediction service: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("prediction response is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("prediction service error: {0}")]
    Transport(String),
}

/// Verdict returned by the prediction service for one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionVerdict {
    /// `"Yes"` or `"No"`.
    #[serde(rename = "Maintenance Required")]
    pub maintenance_required: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Suggested Action")]
    pub suggested_action: String,
    /// `"Low"`, `"Medium"` or `"High"`.
    #[serde(rename = "Urgency Level")]
    pub urgency_level: String,
}

#[derive(Deserialize)]
struct VerdictPayload {
    #[serde(rename = "Maintenance Required")]
    maintenance_required: Option<String>,
    #[serde(rename = "Reason")]
    reason: Option<String>,
    #[serde(rename = "Suggested Action")]
    suggested_action: Option<String>,
    #[serde(rename = "Urgency Level")]
    urgency_level: Option<String>,
}

impl VerdictPayload {
    fn into_verdict(self) -> Result<PredictionVerdict, PredictionError> {
        Ok(PredictionVerdict {
            maintenance_required: required(self.maintenance_required, "Maintenance Required")?,
            reason: required(self.reason, "Reason")?,
            suggested_action: required(self.suggested_action, "Suggested Action")?,
            urgency_level: required(self.urgency_level, "Urgency Level")?,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, PredictionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(PredictionError::MissingField(name))
}

/// Sends a rendered request to the prediction service and returns its raw text answer.
pub trait PredictionTransport: Send + Sync {
    fn complete(&self, request: &str) -> Result<String, PredictionError>;
}

impl<F> PredictionTransport for F
where
    F: Fn(&str) -> Result<String, PredictionError> + Send + Sync,
{
    fn complete(&self, request: &str) -> Result<String, PredictionError> {
        self(request)
    }
}

/// Render all seven canonical fields as `Label: value` lines, labelled with each field's
/// preferred name.
pub fn render_machine_data(record: &MachineRecord) -> String {
    FIELD_SCHEMA
        .iter()
        .map(|d| format!("{}: {}", d.display_name(), record.field(d.key)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if present, and trim.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // Drop an optional language tag on the opening line.
    inner
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_')
        .trim()
}

/// Parse a service answer into a verdict.
pub fn parse_verdict(text: &str) -> Result<PredictionVerdict, PredictionError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(PredictionError::EmptyResponse);
    }
    let payload: VerdictPayload = serde_json::from_str(body)?;
    payload.into_verdict()
}

/// Ask the prediction service about one machine.
pub fn analyze_machine<T>(transport: &T, record: &MachineRecord) -> Result<PredictionVerdict, PredictionError>
where
    T: PredictionTransport + ?Sized,
{
    let request = render_machine_data(record);
    debug!(machine_id = %record.machine_id, "requesting maintenance prediction");
    let response = transport.complete(&request)?;
    parse_verdict(&response)
}

/// Issued by [`SelectionGuard::select`]; identifies one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    machine_id: String,
}

impl SelectionTicket {
    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }
}

/// Tracks the current machine selection so stale prediction results can be discarded.
///
/// Every [`select`](Self::select) supersedes all earlier tickets.
#[derive(Debug, Default)]
pub struct SelectionGuard {
    current: AtomicU64,
}

impl SelectionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, machine_id: impl Into<String>) -> SelectionTicket {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionTicket {
            generation,
            machine_id: machine_id.into(),
        }
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.generation
    }

    /// `Some(outcome)` if `ticket` is still the current selection, otherwise `None`.
    pub fn settle<T>(&self, ticket: &SelectionTicket, outcome: T) -> Option<T> {
        if self.is_current(ticket) {
            return Some(outcome);
        }
        debug!(machine_id = %ticket.machine_id, "discarding result for superseded selection");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_verdict, strip_code_fence, PredictionError, SelectionGuard};

    const VERDICT: &str = r#"{
        "Maintenance Required": "Yes",
        "Reason": "Temperature at 95°C exceeds 90°C.",
        "Suggested Action": "Inspect cooling system.",
        "Urgency Level": "High"
    }"#;

    #[test]
    fn strips_json_and_bare_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_verdict() {
        let v = parse_verdict(&format!("```json\n{VERDICT}\n```")).unwrap();
        assert_eq!(v.maintenance_required, "Yes");
        assert_eq!(v.urgency_level, "High");
        assert_eq!(v.suggested_action, "Inspect cooling system.");
    }

    #[test]
    fn missing_or_empty_field_is_an_error() {
        let err = parse_verdict(r#"{"Maintenance Required":"No","Reason":"ok","Suggested Action":"none"}"#)
            .unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("Urgency Level")));

        let err = parse_verdict(
            r#"{"Maintenance Required":"No","Reason":"","Suggested Action":"x","Urgency Level":"Low"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("Reason")));
    }

    #[test]
    fn malformed_and_empty_responses_fail() {
        assert!(matches!(parse_verdict("{\"Reason\": "), Err(PredictionError::MalformedJson(_))));
        assert!(matches!(parse_verdict("   "), Err(PredictionError::EmptyResponse)));
        assert!(matches!(parse_verdict("```\n```"), Err(PredictionError::EmptyResponse)));
    }

    #[test]
    fn later_selection_supersedes_earlier_ticket() {
        let guard = SelectionGuard::new();
        let first = guard.select("M-1");
        assert!(guard.is_current(&first));

        let second = guard.select("M-2");
        assert!(!guard.is_current(&first));
        assert_eq!(guard.settle(&first, "stale"), None);
        assert_eq!(guard.settle(&second, "fresh"), Some("fresh"));
        assert_eq!(second.machine_id(), "M-2");
    }
}
