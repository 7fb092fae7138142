/*!
# Conditional Expressions

Support for the `while=` attribute on blocks. An expression is
`LHS OP RHS` with `OP` one of `=`, `<` or `>`; each operand is either an
integer literal or a `$variable` reference, re-evaluated on every test.

Expressions that cannot be decoded (no operator, more than one candidate
operator, operator in first position) collapse to a constant `true` with a
warning, so a broken condition never suppresses output. Expressions whose
operands are both literals fold to a constant at parse time.
*/

use tracing::warn;

use crate::segment::common::SegmentCore;
use crate::vars::VarTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Lt,
    Gt,
}

impl Op {
    /// Defaults used when an operand fails to resolve, chosen per operator
    /// so an undecidable comparison evaluates to `true`.
    fn operand_defaults(self) -> (i64, i64) {
        match self {
            Op::Eq => (1, 1),
            Op::Lt => (0, 1),
            Op::Gt => (1, 0),
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Op::Eq => lhs == rhs,
            Op::Lt => lhs < rhs,
            Op::Gt => lhs > rhs,
        }
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Const(bool),
    Compare { op: Op, lhs: String, rhs: String },
}

/// A compiled `while=` condition.
#[derive(Debug, Clone)]
pub struct Condition {
    kind: Kind,
}

impl Condition {
    /// Parses a condition expression. Never fails; undecodable input becomes
    /// a constant `true`.
    pub fn parse(expr: &str) -> Self {
        let candidates: Vec<(Op, usize)> = [("=", Op::Eq), ("<", Op::Lt), (">", Op::Gt)]
            .into_iter()
            .filter_map(|(sym, op)| expr.find(sym).map(|pos| (op, pos)))
            .collect();
        if candidates.len() != 1 || candidates[0].1 == 0 {
            warn!("invalid condition string: {}", expr);
            return Self {
                kind: Kind::Const(true),
            };
        }
        let (op, pos) = candidates[0];
        let lhs = expr[..pos].to_string();
        let rhs = expr[pos + 1..].to_string();
        if !lhs.starts_with('$') && !rhs.starts_with('$') {
            // No variables anywhere, so the result can never change.
            let (dl, dr) = op.operand_defaults();
            let value = op.apply(parse_operand(&lhs, dl), parse_operand(&rhs, dr));
            return Self {
                kind: Kind::Const(value),
            };
        }
        Self {
            kind: Kind::Compare { op, lhs, rhs },
        }
    }

    /// The folded value, if the condition is a parse-time constant.
    pub fn as_const(&self) -> Option<bool> {
        match self.kind {
            Kind::Const(value) => Some(value),
            Kind::Compare { .. } => None,
        }
    }

    /// Evaluates the condition against the current variables, using the
    /// segment's generators for `$RANDOM`/`$ZIPF` operands.
    pub fn test(&self, core: &mut SegmentCore, vars: &VarTable) -> bool {
        match &self.kind {
            Kind::Const(value) => *value,
            Kind::Compare { op, lhs, rhs } => {
                let (dl, dr) = op.operand_defaults();
                let left = core.int_param(lhs, dl, vars);
                let right = core.int_param(rhs, dr, vars);
                op.apply(left, right)
            }
        }
    }
}

fn parse_operand(text: &str, default: i64) -> i64 {
    text.trim().parse::<i64>().map(i64::abs).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> SegmentCore {
        SegmentCore::new("block", 0)
    }

    #[test]
    fn literal_expressions_fold() {
        assert_eq!(Condition::parse("1<2").as_const(), Some(true));
        assert_eq!(Condition::parse("2<1").as_const(), Some(false));
        assert_eq!(Condition::parse("3=3").as_const(), Some(true));
        assert_eq!(Condition::parse("4>9").as_const(), Some(false));
    }

    #[test]
    fn ambiguous_expressions_default_true() {
        assert_eq!(Condition::parse("1").as_const(), Some(true));
        assert_eq!(Condition::parse("1<2>3").as_const(), Some(true));
        assert_eq!(Condition::parse("=5").as_const(), Some(true));
    }

    #[test]
    fn variable_operands_reevaluate() {
        let cond = Condition::parse("$count>2");
        assert!(cond.as_const().is_none());
        let mut vars = VarTable::new();
        let mut core = core();
        vars.set("count", "5");
        assert!(cond.test(&mut core, &vars));
        vars.set("count", "1");
        assert!(!cond.test(&mut core, &vars));
    }

    #[test]
    fn unset_variable_defaults_to_true() {
        let cond = Condition::parse("$missing=1");
        let mut core = core();
        assert!(cond.test(&mut core, &VarTable::new()));
    }
}
