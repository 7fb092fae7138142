/*!
# File Sub-Includes

`<?gen.file source=PATH ?>` splices another template into the tree. The
referenced file is read and compiled during parsing, producing a nested root
block; at generate time the include transforms the incoming context through
its own range parameters and delegates to that block.

Include chains are bounded: more than `MAX_INCLUDE_DEPTH` nested templates
(which is what a self-including template produces) aborts the parse.
*/

use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::core::{GenError, MAX_INCLUDE_DEPTH};
use crate::segment::block::Block;
use crate::segment::common::{warn_unrecognized, SegmentCore};
use crate::template::parser::{self, ParseContext};
use crate::template::read_template_text;
use crate::vars::VarTable;

/// Construction failure for an include: either a malformed argument list
/// (reported with template offset by the caller) or a fatal engine error
/// from reading or parsing the included file.
pub(crate) enum IncludeError {
    Decode(String),
    Fatal(GenError),
}

impl From<GenError> for IncludeError {
    fn from(err: GenError) -> Self {
        IncludeError::Fatal(err)
    }
}

#[derive(Debug)]
pub struct Include {
    core: SegmentCore,
    path: String,
    root: Block,
}

impl Include {
    pub(crate) fn from_args(
        args: &str,
        ctx: &mut ParseContext<'_>,
    ) -> Result<Option<Self>, IncludeError> {
        let mut core = SegmentCore::new("file", ctx.next_id());
        let Some(extras) = core
            .decode_args(args, ctx.vars)
            .map_err(IncludeError::Decode)?
        else {
            return Ok(None);
        };
        let mut path = None;
        for (key, value) in &extras {
            match key.as_str() {
                "source" => path = Some(value.clone()),
                _ => {
                    warn_unrecognized("file", key, value);
                    return Ok(None);
                }
            }
        }
        core.coerce_bounds();
        let Some(path) = path else {
            warn!("file instruction is missing source=, dropping segment");
            return Ok(None);
        };
        if ctx.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(GenError::IncludeDepth {
                path,
                limit: MAX_INCLUDE_DEPTH,
            }
            .into());
        }
        let text = read_template_text(Path::new(&path))?;
        ctx.include_depth += 1;
        let parsed = parser::parse_template(&text, ctx);
        ctx.include_depth -= 1;
        let root = parsed?;
        core.init_zipf(core.zipf_limit());
        Ok(Some(Self { core, path, root }))
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Path of the included template, as written in the instruction.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn generate(
        &mut self,
        context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        // The include's own range parameters rescale the caller's context
        // before it reaches the nested tree.
        let sub_context = self.core.transform(context);
        self.root.generate(sub_context, vars, out)
    }
}
