/*!
# Block Segments

`<?gen.begin name=NAME count=N min=M max=N ratio=0.R context=CCC while=EXPR ?>`
...
`<?gen.end name=NAME ?>`

A block owns an ordered list of child segments and replays them N times per
generate call. N is exact (`count=`), uniform in `[min, max]`, or
ratio-decayed: starting from `min`, each additional iteration happens with
probability `ratio`, so counts tail off geometrically and are capped at
`max`.

Each iteration hands every child a context number computed by the block's
context rule:

* `incremental` - a counter that keeps rising across the block's lifetime
* `nested` - the counter resets to zero on each generate call
* `combined` (default) - `parent_context * max + counter`, which numbers the
  whole iteration lattice uniquely when fanouts are fixed

An optional `while=` condition is tested on entry; a false condition makes
the whole call a no-op.
*/

use std::io::Write;

use rand::Rng;
use tracing::warn;

use crate::core::GenError;
use crate::segment::common::{warn_unrecognized, DecodeError, SegmentCore};
use crate::segment::condition::Condition;
use crate::segment::Segment;
use crate::vars::VarTable;

/// Rule for deriving the context passed to child segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRule {
    Incremental,
    Nested,
    Combined,
}

#[derive(Debug)]
pub struct Block {
    pub(crate) core: SegmentCore,
    children: Vec<Segment>,
    counter: i64,
    parent_context: i64,
    rule: ContextRule,
    /// Geometric decay probability for the iteration count, when valid.
    ratio: Option<f32>,
    /// Iteration count drawn uniformly from `[min, max]`.
    random_count: bool,
    condition: Option<Condition>,
}

impl Block {
    /// The implicit root block of a template: one iteration, combined
    /// context, so the caller's context number flows straight through.
    pub fn root(id: u32) -> Self {
        let mut core = SegmentCore::new("block", id);
        core.min = 1;
        core.max = 1;
        Self::with_core(core, ContextRule::Combined, None, false, None)
    }

    pub fn from_args(
        args: &str,
        id: u32,
        vars: &mut VarTable,
    ) -> Result<Option<Self>, DecodeError> {
        let mut core = SegmentCore::new("block", id);
        let Some(extras) = core.decode_args(args, vars)? else {
            return Ok(None);
        };
        let mut rule = ContextRule::Combined;
        let mut ratio = None;
        let mut condition = None;
        for (key, value) in &extras {
            match key.as_str() {
                "context" => match value.to_lowercase().as_str() {
                    "incremental" => rule = ContextRule::Incremental,
                    "nested" => rule = ContextRule::Nested,
                    "combined" => rule = ContextRule::Combined,
                    _ => warn!("unknown context rule {:?}, keeping combined", value),
                },
                "ratio" => {
                    ratio = match value.parse::<f32>() {
                        // Decay ratios are only meaningful below 1.
                        Ok(r) if r.abs() < 1.0 => Some(r.abs()),
                        Ok(_) | Err(_) => None,
                    }
                }
                "while" => condition = Some(Condition::parse(value)),
                _ => {
                    warn_unrecognized("block", key, value);
                    return Ok(None);
                }
            }
        }
        core.coerce_bounds();
        if ratio.is_some() && core.max == core.min {
            warn!("block {}: ratio invalid when min == max", core.name);
            ratio = None;
        }
        let random_count = ratio.is_none() && core.max != core.min;
        core.init_zipf(core.zipf_limit());
        Ok(Some(Self::with_core(
            core,
            rule,
            ratio,
            random_count,
            condition,
        )))
    }

    fn with_core(
        core: SegmentCore,
        rule: ContextRule,
        ratio: Option<f32>,
        random_count: bool,
        condition: Option<Condition>,
    ) -> Self {
        Self {
            core,
            children: Vec::new(),
            counter: 0,
            parent_context: 0,
            rule,
            ratio,
            random_count,
            condition,
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Appends a parsed child segment; children replay in insertion order.
    pub fn push(&mut self, segment: Segment) {
        self.children.push(segment);
    }

    pub fn generate(
        &mut self,
        context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        if let Some(condition) = &self.condition {
            if !condition.test(&mut self.core, vars) {
                return Ok(0);
            }
        }
        self.parent_context = context;
        if self.rule != ContextRule::Incremental {
            self.counter = 0;
        }
        let iterations = self.iteration_count();
        let mut size = 0u64;
        for _ in 0..iterations {
            let child_context = self.child_context();
            for child in &mut self.children {
                size += child.generate(child_context, vars, out)?;
            }
            self.counter += 1;
        }
        Ok(size)
    }

    /// Number of child replays for this call.
    fn iteration_count(&mut self) -> i64 {
        if let Some(ratio) = self.ratio {
            let mut count = self.core.min;
            for _ in self.core.min..self.core.max {
                if self.core.rng().gen::<f32>() < ratio {
                    count += 1;
                } else {
                    break;
                }
            }
            count
        } else if self.random_count {
            let span = self.core.max + 1 - self.core.min;
            self.core.min + self.core.random_int(span)
        } else {
            self.core.max
        }
    }

    /// Context for the current iteration's children.
    fn child_context(&self) -> i64 {
        match self.rule {
            ContextRule::Incremental | ContextRule::Nested => self.counter,
            ContextRule::Combined => self
                .parent_context
                .wrapping_mul(self.core.max)
                .wrapping_add(self.counter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::literal::Literal;

    fn build(args: &str) -> Block {
        let mut vars = VarTable::new();
        Block::from_args(args, 0, &mut vars).unwrap().unwrap()
    }

    fn with_marker(mut block: Block) -> Block {
        block.push(Segment::Literal(Literal::new("x").unwrap()));
        block
    }

    fn render(block: &mut Block, context: i64) -> String {
        let mut vars = VarTable::new();
        let mut out = Vec::new();
        block.generate(context, &mut vars, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn exact_count_replays_children() {
        let mut block = with_marker(build("count=3"));
        assert_eq!(render(&mut block, 0), "xxx");
    }

    #[test]
    fn random_count_stays_in_bounds() {
        let mut block = with_marker(build("min=2 max=5"));
        for _ in 0..50 {
            let len = render(&mut block, 0).len();
            assert!((2..=5).contains(&len), "{} iterations", len);
        }
    }

    #[test]
    fn ratio_decay_stays_in_bounds() {
        let mut block = with_marker(build("min=1 max=6 ratio=0.5"));
        let mut total = 0usize;
        for _ in 0..200 {
            let len = render(&mut block, 0).len();
            assert!((1..=6).contains(&len), "{} iterations", len);
            total += len;
        }
        // Expected count is near 1/(1 - 0.5) = 2; far below the max of 6.
        let mean = total as f64 / 200.0;
        assert!(mean < 3.5, "mean {} too high for ratio 0.5", mean);
    }

    #[test]
    fn ratio_rejected_for_exact_count() {
        let mut block = with_marker(build("count=2 ratio=0.9"));
        assert_eq!(render(&mut block, 0), "xx");
        assert_eq!(render(&mut block, 0), "xx");
    }

    #[test]
    fn false_condition_suppresses_block() {
        let mut block = with_marker(build("count=3 while=2<1"));
        assert_eq!(render(&mut block, 0), "");
    }

    #[test]
    fn bad_ratio_falls_back_to_random_count() {
        let mut block = with_marker(build("min=1 max=3 ratio=1.5"));
        for _ in 0..20 {
            let len = render(&mut block, 0).len();
            assert!((1..=3).contains(&len));
        }
    }
}
