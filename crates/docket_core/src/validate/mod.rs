use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::{Case, ValidationWarning};
use crate::error::AppError;
use crate::repo::list_cases;

fn parse_ts(
    field: &str,
    value: &str,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<OffsetDateTime> {
    match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warnings.push(
                ValidationWarning::new(
                    "VALIDATION_TS_PARSE_FAILED",
                    format!("Failed to parse {field}"),
                )
                .with_details(format!("value={value}; err={e}")),
            );
            None
        }
    }
}

/// Validate a case record: both timestamps must parse as RFC3339 and
/// `created_at <= modified_at`.
pub fn validate_case(case: &Case) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let created = parse_ts("created_at", &case.created_at, &mut warnings);
    let modified = parse_ts("modified_at", &case.modified_at, &mut warnings);

    if let (Some(c), Some(m)) = (created, modified) {
        if c > m {
            warnings.push(
                ValidationWarning::new(
                    "VALIDATION_TS_ORDER_VIOLATION",
                    "Timestamp order violation: created_at must be <= modified_at",
                )
                .with_details(format!("created_at={c}; modified_at={m}")),
            );
        }
    }

    warnings
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseValidationReportItem {
    pub case_id: i64,
    pub name: String,
    pub warnings: Vec<ValidationWarning>,
}

/// Validate every case in the store. Cases without warnings are omitted.
pub fn validate_all_cases(conn: &Connection) -> Result<Vec<CaseValidationReportItem>, AppError> {
    let cases = list_cases(conn)?;
    let mut out = Vec::new();

    for case in cases {
        let warnings = validate_case(&case);
        if warnings.is_empty() {
            continue;
        }
        out.push(CaseValidationReportItem {
            case_id: case.id,
            name: case.name,
            warnings,
        });
    }

    Ok(out)
}
