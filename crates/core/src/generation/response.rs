//! Vendor response extraction.
//!
//! Generation vendors return one of several payload shapes. Instead of
//! probing attributes at runtime, the shapes are modeled as an untagged
//! enum whose variant order fixes the extraction priority: a top-level
//! `text` field, then a `parts` array, then the first candidate's content
//! parts. A body that is not JSON at all is treated as raw text.

use serde::Deserialize;

use super::GenerationError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VendorResponse {
    Text { text: String },
    Parts { parts: Vec<Part> },
    Candidates { candidates: Vec<Candidate> },
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

fn join_parts(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

impl VendorResponse {
    fn into_text(self) -> String {
        match self {
            VendorResponse::Text { text } => text,
            VendorResponse::Parts { parts } => join_parts(&parts),
            VendorResponse::Candidates { candidates } => candidates
                .first()
                .map(|c| join_parts(&c.content.parts))
                .unwrap_or_default(),
        }
    }
}

/// Extracts generated text from a vendor response body.
///
/// Returns [`GenerationError::EmptyResponse`] when no shape yields any
/// text.
pub fn parse_vendor_response(body: &str) -> Result<String, GenerationError> {
    let text = match serde_json::from_str::<VendorResponse>(body) {
        Ok(response) => response.into_text(),
        // Not JSON: the body itself is the text.
        Err(_) => body.trim().to_string(),
    };

    if text.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_text_shape() {
        let body = r#"{"text": "Heavenly Father, grant us peace."}"#;
        assert_eq!(
            parse_vendor_response(body).unwrap(),
            "Heavenly Father, grant us peace."
        );
    }

    #[test]
    fn test_parts_shape_joins_text() {
        let body = r#"{"parts": [{"text": "Lord, "}, {"text": "hear us."}]}"#;
        assert_eq!(parse_vendor_response(body).unwrap(), "Lord, hear us.");
    }

    #[test]
    fn test_candidates_shape_uses_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "First."}]}},
                {"content": {"parts": [{"text": "Second."}]}}
            ]
        }"#;
        assert_eq!(parse_vendor_response(body).unwrap(), "First.");
    }

    #[test]
    fn test_text_takes_priority_over_parts() {
        let body = r#"{"text": "primary", "parts": [{"text": "secondary"}]}"#;
        assert_eq!(parse_vendor_response(body).unwrap(), "primary");
    }

    #[test]
    fn test_raw_body_fallback() {
        assert_eq!(
            parse_vendor_response("  A plain text prayer.\n").unwrap(),
            "A plain text prayer."
        );
    }

    #[test]
    fn test_empty_parts_is_empty_response() {
        let body = r#"{"parts": []}"#;
        assert_eq!(
            parse_vendor_response(body).unwrap_err(),
            GenerationError::EmptyResponse
        );
    }

    #[test]
    fn test_empty_body_is_empty_response() {
        assert_eq!(
            parse_vendor_response("   ").unwrap_err(),
            GenerationError::EmptyResponse
        );
    }
}
