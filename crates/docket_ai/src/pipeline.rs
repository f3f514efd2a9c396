use docket_core::error::AppError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::capability::{Attachment, Capability};
use crate::classify::{self, CrimeClassification};
use crate::media;
use crate::stages::clerk::{run_clerk, ClerkReport, ClerkResult};
use crate::stages::delegate::{run_delegate, DelegateResult};
use crate::stages::investigator::{run_investigator, InvestigatorResult};
use crate::stages::press_release::{fallback_statement, run_press_release, PressReleaseResult};
use crate::stages::{
    failure_text, prompts, DegradeReason, StageInput, StageStatus, NO_VALID_INPUT_SENTINEL,
};

/// Incoming analysis request as received from the boundary. Exactly one of
/// `encoded_file` / `plain_text` must be present; `analyze_document`
/// rejects everything else before orchestration starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Base64-encoded file bytes.
    pub encoded_file: Option<String>,
    /// Declared media type of the file, if any.
    pub media_type: Option<String>,
    pub plain_text: Option<String>,
    pub file_name: Option<String>,
}

/// Model and prompt lineage of one analysis run, recorded for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisProvenance {
    pub model: String,
    pub prompt_version: String,
    pub fingerprint: String,
}

/// Aggregate result of one full pipeline run. Immutable once assembled;
/// every field is populated even when every stage degraded, so renderers
/// and the case store never need null-checks.
///
/// The clerk's fields are merged at the top level; the other stages keep
/// their own sub-objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseAnalysis {
    pub extracted_text: String,
    pub language: String,
    pub summary: String,
    pub key_entities: Vec<String>,
    pub report: ClerkReport,
    pub clerk_status: StageStatus,
    pub investigator: InvestigatorResult,
    pub delegate: DelegateResult,
    pub press_release: PressReleaseResult,
    pub crime_classification: CrimeClassification,
    pub provenance: AnalysisProvenance,
}

#[derive(Debug, Clone, Serialize)]
struct FingerprintPayload<'a> {
    model: &'a str,
    prompt_version: &'a str,
}

fn compute_fingerprint(model: &str) -> Result<String, AppError> {
    let payload = FingerprintPayload {
        model,
        prompt_version: prompts::PROMPT_VERSION,
    };
    let json = serde_json::to_string(&payload).map_err(|e| {
        AppError::new(
            "ANALYZE_FINGERPRINT_FAILED",
            "Failed to serialize provenance fingerprint payload",
        )
        .with_details(e.to_string())
    })?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

fn provenance(model: &str) -> AnalysisProvenance {
    AnalysisProvenance {
        model: model.to_string(),
        prompt_version: prompts::PROMPT_VERSION.to_string(),
        fingerprint: compute_fingerprint(model).unwrap_or_else(|_| "unavailable".to_string()),
    }
}

fn quote_snippet(text: &str) -> String {
    const MAX: usize = 120;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    format!("{cut}...")
}

/// Analyze one document/file/text through the full stage sequence.
///
/// The only error this returns is the fail-fast rejection of a request
/// that does not carry exactly one of file content or plain text. Every
/// accepted request produces a fully populated `CaseAnalysis`: stage
/// failures are absorbed as degraded results, and anything unexpected is
/// caught here and converted into a result whose fields state the
/// critical error.
pub fn analyze_document(
    cap: &dyn Capability,
    model: &str,
    req: &AnalysisRequest,
) -> Result<CaseAnalysis, AppError> {
    let has_file = req.encoded_file.is_some();
    let has_text = req.plain_text.is_some();
    if has_file == has_text {
        return Err(AppError::new(
            "ANALYZE_INVALID_INPUT",
            "Request must contain exactly one of encoded file content or plain text",
        )
        .with_details(format!(
            "encoded_file={}; plain_text={}",
            has_file, has_text
        )));
    }

    match run_pipeline(cap, model, req) {
        Ok(analysis) => Ok(analysis),
        Err(e) => {
            tracing::error!(error = %e, "document analysis failed unexpectedly; returning sentineled result");
            Ok(critical_failure_analysis(model, &e))
        }
    }
}

fn run_pipeline(
    cap: &dyn Capability,
    model: &str,
    req: &AnalysisRequest,
) -> Result<CaseAnalysis, AppError> {
    // Intake backstop behind the boundary check: a present-but-blank field
    // must still never reach the stages.
    let file_content = req
        .encoded_file
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let text_content = req
        .plain_text
        .as_deref()
        .filter(|t| !t.trim().is_empty());
    if file_content.is_none() && text_content.is_none() {
        return Ok(invalid_input_analysis(model, req));
    }

    let intake = intake_input(req, file_content, text_content);

    // The investigator reasons over the input exactly as classified at
    // intake; the system-notice correction below applies only to the
    // stages after it.
    let investigator = run_investigator(cap, model, &intake);

    let corrected = corrected_for_later_stages(&intake);
    let clerk = run_clerk(cap, model, &corrected);
    let delegate = run_delegate(cap, model, &corrected, &investigator, &clerk);
    let press_release = run_press_release(cap, model, &corrected, &clerk, &delegate);

    let crime_classification = if classify::usable_for_classification(&clerk.extracted_text) {
        let context = req.file_name.as_deref().map(|n| format!("Source file: {n}"));
        classify::classify_text_for_crimes(cap, model, &clerk.extracted_text, context.as_deref())
    } else {
        skipped_classification(&clerk)
    };

    let fingerprint = compute_fingerprint(model)?;

    Ok(CaseAnalysis {
        extracted_text: clerk.extracted_text,
        language: clerk.language,
        summary: clerk.summary,
        key_entities: clerk.key_entities,
        report: clerk.report,
        clerk_status: clerk.status,
        investigator,
        delegate,
        press_release,
        crime_classification,
        provenance: AnalysisProvenance {
            model: model.to_string(),
            prompt_version: prompts::PROMPT_VERSION.to_string(),
            fingerprint,
        },
    })
}

fn intake_input(
    req: &AnalysisRequest,
    file_content: Option<&str>,
    text_content: Option<&str>,
) -> StageInput {
    if let Some(file) = file_content {
        let effective =
            media::effective_media_type(req.file_name.as_deref(), req.media_type.as_deref());
        let processable = effective
            .as_deref()
            .map(media::is_processable)
            .unwrap_or(false);

        if processable {
            return StageInput::from_file(
                Attachment {
                    data_base64: file.to_string(),
                    // processable implies the effective type resolved
                    media_type: effective.unwrap_or_default(),
                },
                req.file_name.clone(),
            );
        }

        let notice = media::system_notice(
            req.file_name.as_deref(),
            effective.as_deref().or(req.media_type.as_deref()),
        );
        return StageInput::from_text(notice, req.file_name.clone());
    }

    StageInput::from_text(
        text_content.unwrap_or_default().to_string(),
        req.file_name.clone(),
    )
}

/// A system-notice text always forces non-media handling, regardless of
/// what the flags claim. Applied to the clerk, delegate and press-release
/// inputs only (the investigator keeps the uncorrected intake input).
fn corrected_for_later_stages(input: &StageInput) -> StageInput {
    if input.is_system_notice() {
        return StageInput {
            file: None,
            text: input.text.clone(),
            file_name: input.file_name.clone(),
            media_capable: false,
        };
    }
    input.clone()
}

fn skipped_classification(clerk: &ClerkResult) -> CrimeClassification {
    let reason = match &clerk.status {
        StageStatus::Degraded { reason, .. } => reason.clone(),
        StageStatus::Ok => DegradeReason::NoInput,
    };
    CrimeClassification::skipped(
        reason,
        "extracted text not usable",
        format!(
            "Classification was skipped: the extracted text was not usable for classification (\"{}\").",
            quote_snippet(&clerk.extracted_text)
        ),
    )
}

fn invalid_input_analysis(model: &str, req: &AnalysisRequest) -> CaseAnalysis {
    let sentinel = NO_VALID_INPUT_SENTINEL.to_string();
    let status = StageStatus::degraded(DegradeReason::InvalidRequest, "no usable content in request");

    CaseAnalysis {
        extracted_text: sentinel.clone(),
        language: sentinel.clone(),
        summary: sentinel.clone(),
        key_entities: Vec::new(),
        report: ClerkReport {
            title: sentinel.clone(),
            body: sentinel.clone(),
        },
        clerk_status: status.clone(),
        investigator: InvestigatorResult {
            status: status.clone(),
            observations: sentinel.clone(),
            leads: Vec::new(),
        },
        delegate: DelegateResult {
            status: status.clone(),
            overall_assessment: sentinel.clone(),
            suggested_actions: Vec::new(),
            legal_considerations: sentinel.clone(),
        },
        press_release: PressReleaseResult {
            status: status.clone(),
            text: fallback_statement(req.file_name.as_deref()),
        },
        crime_classification: CrimeClassification {
            status,
            tags: Vec::new(),
            overall_assessment: sentinel,
        },
        provenance: provenance(model),
    }
}

fn critical_failure_analysis(model: &str, err: &AppError) -> CaseAnalysis {
    let sentinel = failure_text(&format!("critical error: {err}"));
    let status = StageStatus::degraded(DegradeReason::CriticalError, err.to_string());

    CaseAnalysis {
        extracted_text: sentinel.clone(),
        language: sentinel.clone(),
        summary: sentinel.clone(),
        key_entities: Vec::new(),
        report: ClerkReport {
            title: sentinel.clone(),
            body: sentinel.clone(),
        },
        clerk_status: status.clone(),
        investigator: InvestigatorResult {
            status: status.clone(),
            observations: sentinel.clone(),
            leads: Vec::new(),
        },
        delegate: DelegateResult {
            status: status.clone(),
            overall_assessment: sentinel.clone(),
            suggested_actions: Vec::new(),
            legal_considerations: sentinel.clone(),
        },
        press_release: PressReleaseResult {
            status: status.clone(),
            text: sentinel.clone(),
        },
        crime_classification: CrimeClassification {
            status,
            tags: Vec::new(),
            overall_assessment: sentinel,
        },
        provenance: provenance(model),
    }
}
