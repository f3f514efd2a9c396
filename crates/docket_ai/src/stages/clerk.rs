use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};

use super::{
    failure_text, prompts, DegradeReason, StageInput, StageStatus, EMPTY_RESPONSE_DETAIL,
    FIELD_NOT_PROVIDED, NO_INPUT_DETAIL,
};

/// Formal case-record entry produced alongside the extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClerkReport {
    pub title: String,
    pub body: String,
}

/// The clerk owns `extracted_text`: it is the single source of truth for
/// what the rest of the pipeline treats as the document's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClerkResult {
    pub status: StageStatus,
    pub extracted_text: String,
    pub language: String,
    pub summary: String,
    pub key_entities: Vec<String>,
    pub report: ClerkReport,
}

impl ClerkResult {
    fn degraded(reason: DegradeReason, detail: &str) -> Self {
        let sentinel = failure_text(detail);
        Self {
            status: StageStatus::degraded(reason, detail),
            extracted_text: sentinel.clone(),
            language: sentinel.clone(),
            summary: sentinel.clone(),
            key_entities: Vec::new(),
            report: ClerkReport {
                title: sentinel.clone(),
                body: sentinel,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClerkReport {
    title: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClerkOutput {
    extracted_text: Option<String>,
    language: Option<String>,
    summary: Option<String>,
    key_entities: Option<Vec<String>>,
    report: Option<RawClerkReport>,
}

fn or_default(field: Option<String>) -> String {
    field
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string())
}

/// Never returns an error. Three input sub-cases: attached media is
/// extracted by the capability; plain text and system notices are pinned
/// verbatim into `extracted_text` so the field stays deterministic for
/// non-media input (the capability still supplies language, summary,
/// entities, and the formal report).
pub fn run_clerk(cap: &dyn Capability, model: &str, input: &StageInput) -> ClerkResult {
    if !input.has_content() {
        return ClerkResult::degraded(DegradeReason::NoInput, NO_INPUT_DETAIL);
    }

    let req = CapabilityRequest {
        task: "clerk",
        model: model.to_string(),
        prompt: prompts::clerk_prompt(input),
        attachment: input.file.clone(),
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "clerk", error = %e, "stage degraded");
            ClerkResult::degraded(DegradeReason::CapabilityError, &e.to_string())
        }
        Ok(None) => ClerkResult::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
        Ok(Some(value)) => match serde_json::from_value::<RawClerkOutput>(value) {
            Err(e) => ClerkResult::degraded(
                DegradeReason::CapabilityError,
                &format!("malformed stage output: {e}"),
            ),
            Ok(raw) => {
                let extracted_text = match input.text.as_deref() {
                    // Non-media input: the supplied text (or notice) is the
                    // extraction, verbatim.
                    Some(text) => text.to_string(),
                    None => or_default(raw.extracted_text),
                };

                let report = match raw.report {
                    Some(r) => ClerkReport {
                        title: or_default(r.title),
                        body: or_default(r.body),
                    },
                    None => ClerkReport {
                        title: FIELD_NOT_PROVIDED.to_string(),
                        body: FIELD_NOT_PROVIDED.to_string(),
                    },
                };

                ClerkResult {
                    status: StageStatus::Ok,
                    extracted_text,
                    language: or_default(raw.language),
                    summary: or_default(raw.summary),
                    key_entities: raw.key_entities.unwrap_or_default(),
                    report,
                }
            }
        },
    }
}
