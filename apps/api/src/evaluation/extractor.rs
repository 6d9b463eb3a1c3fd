//! Response extractor — turns a model's free-form reply into a typed record.
//!
//! The model is told to return raw JSON, but frequently wraps it in a markdown
//! fence anyway. Fences are stripped; everything else must match the target
//! shape exactly. Nothing is defaulted: a missing field, a type mismatch, an
//! out-of-range score or trailing text is a `ParseError` carrying the raw reply.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// The model's reply did not conform to the expected schema.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// The untouched model reply, kept for operator diagnostics only.
    pub raw: String,
}

impl ParseError {
    fn new(message: String, raw: &str) -> Self {
        Self {
            message,
            raw: raw.to_string(),
        }
    }
}

/// A record the extractor can produce from a model reply.
pub trait ResponseShape: DeserializeOwned {
    /// Human-readable name used in error messages.
    const NAME: &'static str;

    /// Semantic checks serde cannot express (score ranges).
    fn validate(&self) -> Result<(), String>;
}

/// Strips a leading ```` ``` ```` / ```` ```json ```` opener and a trailing
/// ```` ``` ```` closer, trimming whitespace around both.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();

    let text = match text.strip_prefix("```") {
        // The tag may be followed by a newline, a space or the body itself.
        Some(rest) => rest.trim_start_matches(is_language_tag_char).trim_start(),
        None => text,
    };

    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn is_language_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parses `raw` into `T`, failing loudly on anything that does not match.
pub fn parse<T: ResponseShape>(raw: &str) -> Result<T, ParseError> {
    let body = strip_code_fences(raw);

    let value: T = serde_json::from_str(body).map_err(|e| {
        ParseError::new(
            format!("{} reply does not match the expected schema: {e}", T::NAME),
            raw,
        )
    })?;

    value
        .validate()
        .map_err(|reason| ParseError::new(format!("{} reply is invalid: {reason}", T::NAME), raw))?;

    Ok(value)
}
