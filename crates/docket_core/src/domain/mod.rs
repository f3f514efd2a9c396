use serde::{Deserialize, Serialize};

/// Lifecycle of a case. Transitions are unconstrained; the store applies
/// whatever the caller sends (last write wins).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Investigating => "investigating",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "investigating" => Some(Self::Investigating),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Canonical case record.
///
/// Timestamps are RFC3339 UTC strings supplied by the caller; validators
/// surface warnings for unparseable or out-of-order values instead of
/// guessing (see `validate`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Case {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: CaseStatus,
    pub created_at: String,
    pub modified_at: String,
}

/// Kind of analysis attached to a case. Mirrors the flow that produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Document,
    Audio,
    Financial,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Document => "document",
            AnalysisKind::Audio => "audio",
            AnalysisKind::Financial => "financial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "audio" => Some(Self::Audio),
            "financial" => Some(Self::Financial),
            _ => None,
        }
    }
}

/// One analysis run attached to a case. Append-only: records are never
/// mutated after creation and only disappear when their case is deleted.
///
/// `result` is the full pipeline output as produced by the AI crate,
/// stored opaquely; `artifact_hash` fingerprints it for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub id: i64,
    pub case_id: i64,
    pub created_at: String,
    pub kind: AnalysisKind,
    pub original_file_name: Option<String>,
    pub summary: String,
    pub result: serde_json::Value,
    pub artifact_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
