//! Literal template text passed through to the output unchanged.

use std::io::Write;

use crate::core::GenError;

/// Free text found between processing instructions, stored as raw bytes.
#[derive(Debug, Clone)]
pub struct Literal {
    text: Vec<u8>,
}

impl Literal {
    /// Wraps a slice of template text. Returns `None` for empty text so the
    /// parser can skip zero-length segments.
    pub fn new(text: &str) -> Option<Self> {
        if text.is_empty() {
            None
        } else {
            Some(Self {
                text: text.as_bytes().to_vec(),
            })
        }
    }

    pub fn generate(&self, out: &mut dyn Write) -> Result<u64, GenError> {
        out.write_all(&self.text).map_err(|source| GenError::Write {
            segment: "literal".to_string(),
            source,
        })?;
        Ok(self.text.len() as u64)
    }
}
