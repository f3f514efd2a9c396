use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};

use super::{
    failure_text, prompts, DegradeReason, StageInput, StageStatus, EMPTY_RESPONSE_DETAIL,
    FIELD_NOT_PROVIDED, NO_INPUT_DETAIL,
};

/// Free-text observations plus follow-up leads derived from the raw
/// evidence. Independent of every other stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvestigatorResult {
    pub status: StageStatus,
    pub observations: String,
    pub leads: Vec<String>,
}

impl InvestigatorResult {
    fn degraded(reason: DegradeReason, detail: &str) -> Self {
        Self {
            status: StageStatus::degraded(reason, detail),
            observations: failure_text(detail),
            leads: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawInvestigatorOutput {
    observations: Option<String>,
    leads: Option<Vec<String>>,
}

/// Never returns an error: any failure is absorbed into a degraded result
/// whose fields carry sentinel text.
pub fn run_investigator(
    cap: &dyn Capability,
    model: &str,
    input: &StageInput,
) -> InvestigatorResult {
    if !input.has_content() {
        return InvestigatorResult::degraded(DegradeReason::NoInput, NO_INPUT_DETAIL);
    }

    let req = CapabilityRequest {
        task: "investigator",
        model: model.to_string(),
        prompt: prompts::investigator_prompt(input),
        attachment: input.file.clone(),
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "investigator", error = %e, "stage degraded");
            InvestigatorResult::degraded(DegradeReason::CapabilityError, &e.to_string())
        }
        Ok(None) => InvestigatorResult::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
        Ok(Some(value)) => match serde_json::from_value::<RawInvestigatorOutput>(value) {
            Err(e) => InvestigatorResult::degraded(
                DegradeReason::CapabilityError,
                &format!("malformed stage output: {e}"),
            ),
            Ok(raw) => InvestigatorResult {
                status: StageStatus::Ok,
                observations: raw
                    .observations
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string()),
                leads: raw.leads.unwrap_or_default(),
            },
        },
    }
}
