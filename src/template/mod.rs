/*!
# Compiled Templates

[`Template`] is the public face of the engine: it compiles template text
into a segment tree and drives generation against caller-supplied sinks.

```
use genxml::Template;

let mut template = Template::parse_str("row <?gen.value order=context ?>")?;
assert_eq!(template.generate_to_string(7)?, "row 7");
# Ok::<(), genxml::GenError>(())
```

One `Template` owns one variables table and one tree; a generation call is a
synchronous depth-first walk. Serial counters and random streams advance
across calls, so repeated calls with the same context intentionally differ
where the template asks for serial or random behavior. For concurrent
generation compile one tree per thread.
*/

pub mod parser;

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::core::{GenError, MAX_TEMPLATE_BYTES};
use crate::segment::block::Block;
use crate::vars::VarTable;
use parser::ParseContext;

/// A compiled template tree plus its variables table.
#[derive(Debug)]
pub struct Template {
    root: Block,
    vars: VarTable,
}

impl Template {
    /// Compiles a template from in-memory text.
    pub fn parse_str(text: &str) -> Result<Self, GenError> {
        if text.len() > MAX_TEMPLATE_BYTES {
            return Err(GenError::TemplateTooLarge {
                size: text.len(),
                limit: MAX_TEMPLATE_BYTES,
            });
        }
        let mut vars = VarTable::new();
        let root = {
            let mut ctx = ParseContext::new(&mut vars);
            parser::parse_template(text, &mut ctx)?
        };
        Ok(Self { root, vars })
    }

    /// Loads and compiles a template file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, GenError> {
        let path = path.as_ref();
        let text = read_template_text(path)?;
        debug!("parsed template {} ({} bytes)", path.display(), text.len());
        Self::parse_str(&text)
    }

    /// Applies a variables spec (`none`, `{k=v,...}` or a properties file
    /// path), overriding any values set earlier. May be called before or
    /// after other `set_variables` calls; the last write wins.
    pub fn set_variables(&mut self, spec: &str) {
        self.vars.apply_spec(spec);
    }

    /// Read access to the variables table, mostly useful to inspect values
    /// left behind by `save=` segments.
    pub fn variables(&self) -> &VarTable {
        &self.vars
    }

    /// Streams one generated document into `out`, returning the exact byte
    /// count written. `context` is the caller-chosen root context, which the
    /// implicit root block passes through to top-level segments.
    pub fn generate<W: Write>(&mut self, context: i64, out: &mut W) -> Result<u64, GenError> {
        let Self { root, vars } = self;
        root.generate(context, vars, out)
    }

    /// Convenience wrapper collecting the generated bytes into a string.
    pub fn generate_to_string(&mut self, context: i64) -> Result<String, GenError> {
        let mut buf = Vec::new();
        self.generate(context, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Reads template text with encoding detection: UTF-16 byte-order marks are
/// honored, plain input is treated as UTF-8 with a Windows-1252 fallback,
/// and a leading BOM character is stripped. Enforces the template size cap.
pub(crate) fn read_template_text(path: &Path) -> Result<String, GenError> {
    let bytes = std::fs::read(path).map_err(|source| GenError::TemplateRead {
        path: path.display().to_string(),
        source,
    })?;
    if bytes.len() > MAX_TEMPLATE_BYTES {
        return Err(GenError::TemplateTooLarge {
            size: bytes.len(),
            limit: MAX_TEMPLATE_BYTES,
        });
    }
    let text = match bytes.as_slice() {
        [0xFF, 0xFE, ..] => encoding_rs::UTF_16LE.decode(&bytes).0.into_owned(),
        [0xFE, 0xFF, ..] => encoding_rs::UTF_16BE.decode(&bytes).0.into_owned(),
        _ => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    "template {} is not valid UTF-8, decoding as Windows-1252",
                    path.display()
                );
                encoding_rs::WINDOWS_1252
                    .decode(&err.into_bytes())
                    .0
                    .into_owned()
            }
        },
    };
    Ok(strip_bom(&text).to_string())
}

/// Removes a leading byte-order mark left over from decoding.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}
