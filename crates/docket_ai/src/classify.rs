use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};
use crate::media;
use crate::stages::{
    is_failure_text, prompts, DegradeReason, StageStatus, EMPTY_RESPONSE_DETAIL,
    FIELD_NOT_PROVIDED, NO_VALID_INPUT_SENTINEL,
};

/// Texts shorter than this are not worth a capability round-trip; the
/// classification is returned empty with an explanation instead.
pub const MIN_CLASSIFIABLE_CHARS: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrimeTag {
    pub kind: String,
    pub rationale: String,
    /// Clamped to 0..=1 on decode.
    pub confidence: f64,
    pub parties: Vec<String>,
    pub excerpts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrimeClassification {
    pub status: StageStatus,
    pub tags: Vec<CrimeTag>,
    pub overall_assessment: String,
}

impl CrimeClassification {
    pub(crate) fn skipped(reason: DegradeReason, detail: &str, assessment: String) -> Self {
        Self {
            status: StageStatus::degraded(reason, detail),
            tags: Vec::new(),
            overall_assessment: assessment,
        }
    }
}

/// Gate for the classification sub-flow: extracted text is usable only if
/// it is non-empty, carries no failure sentinel, is not a synthesized
/// system notice, and is not the orchestrator's invalid-input sentinel.
pub fn usable_for_classification(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty()
        && !is_failure_text(t)
        && !media::is_system_notice(t)
        && t != NO_VALID_INPUT_SENTINEL
}

#[derive(Debug, Deserialize)]
struct RawCrimeTag {
    kind: Option<String>,
    rationale: Option<String>,
    confidence: Option<f64>,
    parties: Option<Vec<String>>,
    excerpts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    tags: Option<Vec<RawCrimeTag>>,
    overall_assessment: Option<String>,
}

fn decode_tag(raw: RawCrimeTag) -> CrimeTag {
    CrimeTag {
        kind: raw
            .kind
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string()),
        rationale: raw
            .rationale
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string()),
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        parties: raw.parties.unwrap_or_default(),
        excerpts: raw.excerpts.unwrap_or_default(),
    }
}

/// Classify potential criminal conduct in `text`. Follows the same
/// contract as the stage functions: never returns an error, and the
/// result is always fully populated.
pub fn classify_text_for_crimes(
    cap: &dyn Capability,
    model: &str,
    text: &str,
    context: Option<&str>,
) -> CrimeClassification {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_CLASSIFIABLE_CHARS {
        return CrimeClassification::skipped(
            DegradeReason::NoInput,
            "text below minimum length",
            format!(
                "Classification was not attempted: the supplied text is shorter than {MIN_CLASSIFIABLE_CHARS} characters and cannot be classified reliably."
            ),
        );
    }

    let req = CapabilityRequest {
        task: "crime_classification",
        model: model.to_string(),
        prompt: prompts::classification_prompt(trimmed, context),
        attachment: None,
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "crime_classification", error = %e, "classification degraded");
            CrimeClassification::skipped(
                DegradeReason::CapabilityError,
                &e.to_string(),
                format!("Classification unavailable: the capability call failed ({e})."),
            )
        }
        Ok(None) => CrimeClassification::skipped(
            DegradeReason::EmptyResponse,
            EMPTY_RESPONSE_DETAIL,
            "Classification unavailable: the capability returned an empty response.".to_string(),
        ),
        Ok(Some(value)) => match serde_json::from_value::<RawClassification>(value) {
            Err(e) => CrimeClassification::skipped(
                DegradeReason::CapabilityError,
                &format!("malformed classification output: {e}"),
                format!("Classification unavailable: the capability returned malformed output ({e})."),
            ),
            Ok(raw) => CrimeClassification {
                status: StageStatus::Ok,
                tags: raw
                    .tags
                    .unwrap_or_default()
                    .into_iter()
                    .map(decode_tag)
                    .collect(),
                overall_assessment: raw
                    .overall_assessment
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string()),
            },
        },
    }
}
