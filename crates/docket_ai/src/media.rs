/// Marker prefixed to synthesized descriptions of files whose binary
/// content cannot be forwarded to the capability. Downstream gating keys
/// off this prefix, so it must stay stable.
pub const SYSTEM_NOTICE_PREFIX: &str = "[system notice]";

/// Media types the capability can ingest directly.
const PROCESSABLE_MEDIA_TYPES: [&str; 4] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "application/pdf",
];

fn is_generic_binary(declared: Option<&str>) -> bool {
    match declared.map(str::trim) {
        None | Some("") => true,
        Some(t) => t.eq_ignore_ascii_case("application/octet-stream"),
    }
}

/// Resolve the media type to use for processability decisions.
///
/// The only extension-based override: a `.pdf` file name corrects an
/// absent or generic-binary declared type to `application/pdf`. Any other
/// declared type is taken at face value.
pub fn effective_media_type(file_name: Option<&str>, declared: Option<&str>) -> Option<String> {
    let pdf_by_name = file_name
        .map(|n| n.trim().to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);

    if is_generic_binary(declared) {
        if pdf_by_name {
            return Some("application/pdf".to_string());
        }
        return declared
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_ascii_lowercase());
    }

    declared.map(|t| t.trim().to_ascii_lowercase())
}

pub fn is_processable(media_type: &str) -> bool {
    PROCESSABLE_MEDIA_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(media_type.trim()))
}

/// Synthesize the plain-text stand-in for an unprocessable file. Names the
/// file and its declared type verbatim so the notice is auditable.
pub fn system_notice(file_name: Option<&str>, media_type: Option<&str>) -> String {
    let name = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("unnamed file");
    let mtype = media_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("unknown");

    format!(
        "{SYSTEM_NOTICE_PREFIX} The file \"{name}\" of type \"{mtype}\" could not be processed directly. Analysis is limited to the file metadata above."
    )
}

pub fn is_system_notice(text: &str) -> bool {
    text.trim_start().starts_with(SYSTEM_NOTICE_PREFIX)
}
