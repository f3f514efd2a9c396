use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};

use super::clerk::ClerkResult;
use super::investigator::InvestigatorResult;
use super::{
    failure_text, prompts, DegradeReason, StageInput, StageStatus, EMPTY_RESPONSE_DETAIL,
    FIELD_NOT_PROVIDED, NO_INPUT_DETAIL,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegateResult {
    pub status: StageStatus,
    pub overall_assessment: String,
    pub suggested_actions: Vec<String>,
    pub legal_considerations: String,
}

impl DelegateResult {
    fn degraded(reason: DegradeReason, detail: &str) -> Self {
        let sentinel = failure_text(detail);
        Self {
            status: StageStatus::degraded(reason, detail),
            overall_assessment: sentinel.clone(),
            suggested_actions: Vec::new(),
            legal_considerations: sentinel,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDelegateOutput {
    overall_assessment: Option<String>,
    suggested_actions: Option<Vec<String>>,
    legal_considerations: Option<String>,
}

fn or_default(field: Option<String>) -> String {
    field
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string())
}

/// Consumes the investigator's and the clerk's results in addition to the
/// raw input. The prompt instructs the capability to declare the
/// evaluation compromised when upstream fields carry failure sentinels
/// rather than fabricate an assessment. Never returns an error.
pub fn run_delegate(
    cap: &dyn Capability,
    model: &str,
    input: &StageInput,
    investigator: &InvestigatorResult,
    clerk: &ClerkResult,
) -> DelegateResult {
    if !input.has_content() {
        return DelegateResult::degraded(DegradeReason::NoInput, NO_INPUT_DETAIL);
    }

    let req = CapabilityRequest {
        task: "delegate",
        model: model.to_string(),
        prompt: prompts::delegate_prompt(input, investigator, clerk),
        attachment: input.file.clone(),
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "delegate", error = %e, "stage degraded");
            DelegateResult::degraded(DegradeReason::CapabilityError, &e.to_string())
        }
        Ok(None) => DelegateResult::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
        Ok(Some(value)) => match serde_json::from_value::<RawDelegateOutput>(value) {
            Err(e) => DelegateResult::degraded(
                DegradeReason::CapabilityError,
                &format!("malformed stage output: {e}"),
            ),
            Ok(raw) => DelegateResult {
                status: StageStatus::Ok,
                overall_assessment: or_default(raw.overall_assessment),
                suggested_actions: raw.suggested_actions.unwrap_or_default(),
                legal_considerations: or_default(raw.legal_considerations),
            },
        },
    }
}
