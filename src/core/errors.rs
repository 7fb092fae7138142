/*!
# Error System

Fatal error types for template compilation and generation.

Recoverable configuration problems (unknown attributes, unparseable numeric
values, invalid decay ratios) are not represented here; those are logged via
`tracing::warn!` and the offending segment is dropped or falls back to a
default, so generation can continue.
*/

use thiserror::Error;

/// Errors that abort a parse or a generation run.
#[derive(Debug, Error)]
pub enum GenError {
    /// Malformed template text. The message carries the byte offset of the
    /// failing instruction plus a snippet of the surrounding template.
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Template input exceeded the size cap.
    #[error("template too large: {size} bytes (limit {limit})")]
    TemplateTooLarge { size: usize, limit: usize },

    /// A chain of `gen.file` instructions nested too deep.
    #[error("include depth exceeded at {path}: more than {limit} nested templates")]
    IncludeDepth { path: String, limit: u32 },

    /// The template (or an included sub-template) could not be read.
    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The output sink failed while a segment was writing to it.
    #[error("write failure in segment {segment}: {source}")]
    Write {
        segment: String,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Builds a parse error whose message includes a short excerpt of the
    /// template starting at `offset`.
    pub fn parse_at(offset: usize, template: &str, message: impl Into<String>) -> Self {
        let mut end = (offset + 80).min(template.len());
        while end > offset && !template.is_char_boundary(end) {
            end -= 1;
        }
        let mut start = offset.min(template.len());
        while start > 0 && !template.is_char_boundary(start) {
            start -= 1;
        }
        let snippet = &template[start..end];
        GenError::Parse {
            offset,
            message: format!("{} (near: {:?})", message.into(), snippet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_includes_offset_and_snippet() {
        let err = GenError::parse_at(7, "Hello, <?gen.bogus ?> world", "unknown instruction");
        let text = err.to_string();
        assert!(text.contains("offset 7"));
        assert!(text.contains("unknown instruction"));
        assert!(text.contains("gen.bogus"));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let template = format!("{}\u{00e9}tail", "x".repeat(79));
        let err = GenError::parse_at(0, &template, "boom");
        assert!(err.to_string().contains("boom"));
    }
}
