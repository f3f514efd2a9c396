use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};
use crate::classify::MIN_CLASSIFIABLE_CHARS;
use crate::stages::{
    failure_text, prompts, DegradeReason, StageStatus, EMPTY_RESPONSE_DETAIL, FIELD_NOT_PROVIDED,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialIndicator {
    pub label: String,
    pub value: String,
    pub concern: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialAnalysis {
    pub status: StageStatus,
    pub summary: String,
    pub indicators: Vec<FinancialIndicator>,
    pub red_flags: Vec<String>,
}

impl FinancialAnalysis {
    fn degraded(reason: DegradeReason, detail: &str) -> Self {
        Self {
            status: StageStatus::degraded(reason, detail),
            summary: failure_text(detail),
            indicators: Vec::new(),
            red_flags: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawIndicator {
    label: Option<String>,
    value: Option<String>,
    concern: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawFinancialAnalysis {
    summary: Option<String>,
    indicators: Option<Vec<RawIndicator>>,
    red_flags: Option<Vec<String>>,
}

fn or_default(field: Option<String>) -> String {
    field
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string())
}

/// Analyze a financial report for indicators and red flags. Same contract
/// as the document stages: never errors, always populated, one capability
/// attempt. Shares the classification flow's minimum-length precheck.
pub fn analyze_financial_report(
    cap: &dyn Capability,
    model: &str,
    report_text: &str,
    context: Option<&str>,
) -> FinancialAnalysis {
    let trimmed = report_text.trim();
    if trimmed.chars().count() < MIN_CLASSIFIABLE_CHARS {
        return FinancialAnalysis::degraded(DegradeReason::NoInput, "report text below minimum length");
    }

    let req = CapabilityRequest {
        task: "financial_analysis",
        model: model.to_string(),
        prompt: prompts::financial_analysis_prompt(trimmed, context),
        attachment: None,
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "financial_analysis", error = %e, "flow degraded");
            FinancialAnalysis::degraded(DegradeReason::CapabilityError, &e.to_string())
        }
        Ok(None) => FinancialAnalysis::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
        Ok(Some(value)) => match serde_json::from_value::<RawFinancialAnalysis>(value) {
            Err(e) => FinancialAnalysis::degraded(
                DegradeReason::CapabilityError,
                &format!("malformed flow output: {e}"),
            ),
            Ok(raw) => FinancialAnalysis {
                status: StageStatus::Ok,
                summary: or_default(raw.summary),
                indicators: raw
                    .indicators
                    .unwrap_or_default()
                    .into_iter()
                    .map(|i| FinancialIndicator {
                        label: or_default(i.label),
                        value: or_default(i.value),
                        concern: i.concern.unwrap_or(false),
                    })
                    .collect(),
                red_flags: raw.red_flags.unwrap_or_default(),
            },
        },
    }
}
