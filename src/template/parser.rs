/*!
# Template Parser

Single-pass scanner that turns template text into a segment tree. Free text
becomes literal segments byte-for-byte; processing instructions
(`<?gen.KIND key=value ... ?>`) become configured segments, with `gen.begin`
recursing into a nested block until its matching `gen.end`.

Layout whitespace after `gen.begin`, `gen.end` and `gen.comment` (newlines
and tabs, but not spaces) is discarded so templates can be indented without
polluting the output.

Malformed structure (a missing `?>`, an instruction without the `gen.`
prefix, an unknown kind, a `gen.end` whose name does not match its
`gen.begin`, an argument pair without `=`) aborts the parse with the
template offset. A segment whose attributes merely fail validation is logged
and omitted, and parsing continues.
*/

use crate::core::GenError;
use crate::segment::block::Block;
use crate::segment::date::DateGen;
use crate::segment::include::{Include, IncludeError};
use crate::segment::literal::Literal;
use crate::segment::value::Value;
use crate::segment::variable::Variable;
use crate::segment::words::Words;
use crate::segment::Segment;
use crate::vars::VarTable;

const PI_BEGIN: &str = "<?";
const PI_END: &str = "?>";
const KIND_PREFIX: &str = "gen.";

/// Mutable state threaded through one compilation: the shared variables
/// table, the id counter that keeps segment names unique, and the include
/// nesting depth.
pub(crate) struct ParseContext<'a> {
    pub vars: &'a mut VarTable,
    pub include_depth: u32,
    ids: u32,
}

impl<'a> ParseContext<'a> {
    pub fn new(vars: &'a mut VarTable) -> Self {
        Self {
            vars,
            include_depth: 0,
            ids: 0,
        }
    }

    /// Allocates the next segment id. Ids are assigned in template order,
    /// which keeps default segment names stable across compilations.
    pub fn next_id(&mut self) -> u32 {
        let id = self.ids;
        self.ids += 1;
        id
    }
}

/// Compiles template text into a tree rooted at an implicit single-iteration
/// combined-context block.
pub(crate) fn parse_template(text: &str, ctx: &mut ParseContext<'_>) -> Result<Block, GenError> {
    let mut root = Block::root(ctx.next_id());
    parse_block_body(&mut root, text, 0, ctx)?;
    Ok(root)
}

/// Parses segments into `block` until its `gen.end` or the end of input,
/// returning the position just past the consumed text.
fn parse_block_body(
    block: &mut Block,
    text: &str,
    mut pos: usize,
    ctx: &mut ParseContext<'_>,
) -> Result<usize, GenError> {
    while pos < text.len() {
        let pi_start = text[pos..].find(PI_BEGIN).map(|p| p + pos);
        let literal_end = pi_start.unwrap_or(text.len());
        if let Some(literal) = Literal::new(&text[pos..literal_end]) {
            block.push(Segment::Literal(literal));
        }
        let Some(pi_start) = pi_start else {
            return Ok(text.len());
        };

        let body_start = pi_start + PI_BEGIN.len();
        let pi_end = text[body_start..]
            .find(PI_END)
            .map(|p| p + body_start)
            .ok_or_else(|| {
                GenError::parse_at(pi_start, text, "processing instruction is missing '?>'")
            })?;
        let inside = text[body_start..pi_end].trim();
        let Some(instruction) = inside.strip_prefix(KIND_PREFIX) else {
            return Err(GenError::parse_at(
                pi_start,
                text,
                "processing instruction must start with 'gen.'",
            ));
        };
        let (kind, args) = match instruction.split_once(char::is_whitespace) {
            Some((kind, args)) => (kind, args.trim()),
            None => (instruction, ""),
        };
        let mut after = pi_end + PI_END.len();

        match kind {
            "value" => {
                let id = ctx.next_id();
                match Value::from_args(args, id, ctx.vars) {
                    Ok(Some(value)) => block.push(Segment::Value(value)),
                    Ok(None) => {}
                    Err(message) => return Err(GenError::parse_at(pi_start, text, message)),
                }
            }
            "words" => {
                let id = ctx.next_id();
                match Words::from_args(args, id, ctx.vars) {
                    Ok(Some(words)) => block.push(Segment::Words(words)),
                    Ok(None) => {}
                    Err(message) => return Err(GenError::parse_at(pi_start, text, message)),
                }
            }
            "date" => {
                let id = ctx.next_id();
                match DateGen::from_args(args, id, ctx.vars) {
                    Ok(Some(date)) => block.push(Segment::Date(date)),
                    Ok(None) => {}
                    Err(message) => return Err(GenError::parse_at(pi_start, text, message)),
                }
            }
            "variable" => {
                let id = ctx.next_id();
                match Variable::from_args(args, id, ctx.vars) {
                    Ok(Some(variable)) => block.push(Segment::Variable(variable)),
                    Ok(None) => {}
                    Err(message) => return Err(GenError::parse_at(pi_start, text, message)),
                }
            }
            "file" => match Include::from_args(args, ctx) {
                Ok(Some(include)) => block.push(Segment::Include(include)),
                Ok(None) => {}
                Err(IncludeError::Decode(message)) => {
                    return Err(GenError::parse_at(pi_start, text, message))
                }
                Err(IncludeError::Fatal(err)) => return Err(err),
            },
            "begin" => {
                let id = ctx.next_id();
                match Block::from_args(args, id, ctx.vars) {
                    Ok(Some(mut child)) => {
                        after = skip_layout_whitespace(text, after);
                        after = parse_block_body(&mut child, text, after, ctx)?;
                        block.push(Segment::Block(child));
                    }
                    // A rejected begin drops just the marker; its body parses
                    // into the enclosing block.
                    Ok(None) => {}
                    Err(message) => return Err(GenError::parse_at(pi_start, text, message)),
                }
            }
            "end" => {
                if let Some(end_name) = end_block_name(args) {
                    if end_name != block.name() {
                        return Err(GenError::parse_at(
                            pi_start,
                            text,
                            format!(
                                "mismatched block begin/end names ({}, {})",
                                block.name(),
                                end_name
                            ),
                        ));
                    }
                }
                return Ok(skip_layout_whitespace(text, after));
            }
            "comment" => {
                after = skip_layout_whitespace(text, after);
            }
            _ => {
                return Err(GenError::parse_at(
                    pi_start,
                    text,
                    format!("invalid template instruction 'gen.{}'", kind),
                ));
            }
        }
        pos = after;
    }
    Ok(pos)
}

/// Extracts the `name=` value from a `gen.end` argument list, if present.
fn end_block_name(args: &str) -> Option<&str> {
    if args.to_lowercase().starts_with("name=") {
        Some(&args[args.find('=').expect("prefix checked") + 1..])
    } else {
        None
    }
}

/// Skips newlines, tabs and other non-space whitespace used for template
/// layout.
fn skip_layout_whitespace(text: &str, mut pos: usize) -> usize {
    for ch in text[pos..].chars() {
        if ch.is_whitespace() && ch != ' ' {
            pos += ch.len_utf8();
        } else {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Block, GenError> {
        let mut vars = VarTable::new();
        let mut ctx = ParseContext::new(&mut vars);
        parse_template(text, &mut ctx)
    }

    fn render(text: &str, context: i64) -> String {
        let mut vars = VarTable::new();
        let mut root = {
            let mut ctx = ParseContext::new(&mut vars);
            parse_template(text, &mut ctx).unwrap()
        };
        let mut out = Vec::new();
        root.generate(context, &mut vars, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn literal_passes_through() {
        assert_eq!(render("Hello, World!", 0), "Hello, World!");
    }

    #[test]
    fn missing_terminator_is_fatal() {
        let err = parse("text <?gen.value order=serial").unwrap_err();
        assert!(err.to_string().contains("missing '?>'"));
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let err = parse("<?gen.widget count=1 ?>").unwrap_err();
        assert!(err.to_string().contains("gen.widget"));
    }

    #[test]
    fn non_gen_instruction_is_fatal() {
        assert!(parse("<?xml version=1.0 ?>").is_err());
    }

    #[test]
    fn mismatched_names_are_fatal() {
        let err = parse("<?gen.begin name=outer count=1 ?>x<?gen.end name=wrong ?>").unwrap_err();
        assert!(err.to_string().contains("mismatched"));
    }

    #[test]
    fn matching_names_parse() {
        let text = "<?gen.begin name=outer count=2 ?>x<?gen.end name=outer ?>";
        assert_eq!(render(text, 0), "xx");
    }

    #[test]
    fn layout_whitespace_after_block_markers_is_dropped() {
        let text = "<?gen.begin count=2 ?>\n\tA <?gen.end ?>\nB";
        assert_eq!(render(text, 0), "A A B");
    }

    #[test]
    fn comments_vanish() {
        assert_eq!(render("a<?gen.comment anything at all ?>\nb", 0), "ab");
    }

    #[test]
    fn rejected_segment_is_omitted() {
        // Unknown attribute rejects the segment but not the parse.
        assert_eq!(render("x<?gen.value bogus=1 ?>y", 0), "xy");
    }

    #[test]
    fn missing_equals_is_fatal() {
        assert!(parse("<?gen.value order ?>").is_err());
    }

    #[test]
    fn nested_blocks_multiply() {
        let text = "<?gen.begin count=2 ?><?gen.begin count=3 ?>.<?gen.end ?><?gen.end ?>";
        assert_eq!(render(text, 0), "......");
    }
}
