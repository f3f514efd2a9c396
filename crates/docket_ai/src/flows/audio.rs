use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};
use crate::stages::{
    failure_text, prompts, DegradeReason, StageStatus, EMPTY_RESPONSE_DETAIL, FIELD_NOT_PROVIDED,
    NO_INPUT_DETAIL,
};

/// One transcribed segment of audio evidence, labeled by its source
/// (recording, channel, speaker turn).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub source_label: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioConsolidation {
    pub status: StageStatus,
    pub merged_transcript: String,
    pub summary: String,
    pub speakers: Vec<String>,
}

/// Deterministic merge used as the fallback transcript: label-prefixed
/// segments in input order. The merged text therefore survives total
/// capability failure.
pub fn local_merge(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{}] {}", s.source_label, s.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn distinct_labels(segments: &[TranscriptSegment]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in segments {
        if !out.contains(&s.source_label) {
            out.push(s.source_label.clone());
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct RawConsolidation {
    merged_transcript: Option<String>,
    summary: Option<String>,
    speakers: Option<Vec<String>>,
}

/// Consolidate transcript segments into one transcript plus a summary.
/// Same contract as the document stages: never errors, always populated.
pub fn consolidate_transcripts(
    cap: &dyn Capability,
    model: &str,
    segments: &[TranscriptSegment],
) -> AudioConsolidation {
    let usable: Vec<&TranscriptSegment> =
        segments.iter().filter(|s| !s.text.trim().is_empty()).collect();
    if usable.is_empty() {
        return AudioConsolidation {
            status: StageStatus::degraded(DegradeReason::NoInput, NO_INPUT_DETAIL),
            merged_transcript: String::new(),
            summary: failure_text(NO_INPUT_DETAIL),
            speakers: Vec::new(),
        };
    }

    let fallback_transcript = local_merge(segments);
    let fallback_speakers = distinct_labels(segments);

    let req = CapabilityRequest {
        task: "audio_consolidation",
        model: model.to_string(),
        prompt: prompts::audio_consolidation_prompt(&fallback_transcript),
        attachment: None,
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "audio_consolidation", error = %e, "flow degraded, using local merge");
            AudioConsolidation {
                status: StageStatus::degraded(DegradeReason::CapabilityError, e.to_string()),
                merged_transcript: fallback_transcript,
                summary: failure_text(&e.to_string()),
                speakers: fallback_speakers,
            }
        }
        Ok(None) => AudioConsolidation {
            status: StageStatus::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
            merged_transcript: fallback_transcript,
            summary: failure_text(EMPTY_RESPONSE_DETAIL),
            speakers: fallback_speakers,
        },
        Ok(Some(value)) => match serde_json::from_value::<RawConsolidation>(value) {
            Err(e) => AudioConsolidation {
                status: StageStatus::degraded(
                    DegradeReason::CapabilityError,
                    format!("malformed flow output: {e}"),
                ),
                merged_transcript: fallback_transcript,
                summary: failure_text(&format!("malformed flow output: {e}")),
                speakers: fallback_speakers,
            },
            Ok(raw) => AudioConsolidation {
                status: StageStatus::Ok,
                merged_transcript: raw
                    .merged_transcript
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(fallback_transcript),
                summary: raw
                    .summary
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| FIELD_NOT_PROVIDED.to_string()),
                speakers: raw
                    .speakers
                    .filter(|s| !s.is_empty())
                    .unwrap_or(fallback_speakers),
            },
        },
    }
}
