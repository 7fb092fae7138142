/*!
# Segment Model

A compiled template is a tree of segments. [`Segment`] is the tagged variant
over the seven node kinds; shared configuration and generators live in
[`common::SegmentCore`], embedded by every configurable variant.

Generation is a depth-first walk: each node writes its bytes to the sink and
reports the exact count written. Mutable state (serial counters, lazy
generators, the words cursor) advances as a side effect, which is why
`generate` takes `&mut self` and why a tree is confined to one generation at
a time.
*/

pub mod block;
pub mod common;
pub mod condition;
pub mod date;
pub mod include;
pub mod literal;
pub mod value;
pub mod variable;
pub mod words;

pub use block::{Block, ContextRule};
pub use common::{Distribution, SegmentCore};
pub use condition::Condition;
pub use date::{DateGen, DateLayout};
pub use include::Include;
pub use literal::Literal;
pub use value::Value;
pub use variable::Variable;
pub use words::Words;

use std::io::Write;

use crate::core::GenError;
use crate::vars::VarTable;

/// One node of a compiled template tree.
#[derive(Debug)]
pub enum Segment {
    Literal(Literal),
    Value(Value),
    Words(Words),
    Date(DateGen),
    Variable(Variable),
    Include(Include),
    Block(Block),
}

impl Segment {
    /// Writes this segment's output for the given context, returning the
    /// number of bytes emitted.
    pub fn generate(
        &mut self,
        context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        match self {
            Segment::Literal(literal) => literal.generate(out),
            Segment::Value(value) => value.generate(context, vars, out),
            Segment::Words(words) => words.generate(context, vars, out),
            Segment::Date(date) => date.generate(context, vars, out),
            Segment::Variable(variable) => variable.generate(context, vars, out),
            Segment::Include(include) => include.generate(context, vars, out),
            Segment::Block(block) => block.generate(context, vars, out),
        }
    }

    /// The segment's name: explicit `name=` if given, the `<kind><id>`
    /// default otherwise.
    pub fn name(&self) -> &str {
        match self {
            Segment::Literal(_) => "literal",
            Segment::Value(value) => value.name(),
            Segment::Words(words) => words.name(),
            Segment::Date(date) => date.name(),
            Segment::Variable(variable) => variable.name(),
            Segment::Include(include) => include.name(),
            Segment::Block(block) => block.name(),
        }
    }
}
