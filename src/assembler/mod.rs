//! Document assembly: fixed stylesheet, markup envelope, attachment
//! filename sanitation.

/// Print stylesheet. The class names form the visual contract with the
/// extractor output and must stay in sync with it.
pub const STYLESHEET: &str = r#"
@page { margin: 10mm; }
body { font-family: 'Segoe UI', sans-serif; font-size: 8.5pt; line-height: 1.2; }
.topic-header { color: #a00; border-bottom: 2px solid #a00; margin: 30px 0 10px 0; page-break-before: always; }
.question { font-weight: bold; margin-top: 10px; }
.option { margin: 2px 0 2px 12px; }
.ans-block { background: #f6fff6; border-left: 4px solid #27ae60; padding: 8px; margin: 5px 0; }
.ans-label { font-weight: bold; color: #27ae60; margin-right: 6px; }
.diagram { max-width: 95%; height: auto; display: block; margin: 10px auto; border: 1px solid #ddd; padding: 5px; }
.math-img { height: 1.1em; vertical-align: middle; display: inline; }
"#;

/// Wrap concatenated topic HTML in the full markup envelope.
pub fn wrap_document(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{STYLESHEET}</style></head><body>{body}</body></html>"
    )
}

/// Characters illegal in HTTP attachment names or common filesystems.
const ILLEGAL_FILENAME_CHARS: [char; 10] = ['\\', '/', '*', '?', ':', '<', '>', '|', '(', ')'];

/// Strip illegal characters and map spaces to underscores. Idempotent.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}
