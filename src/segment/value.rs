/*!
# Value Segments

`<?gen.value order=XXX min=M max=N factor=F format=DDD ratio=R.r save=VVV ?>`

Produces one formatted number per generate call. The distribution selects a
raw integer (context, serial counter, uniform, Zipf or log-decay), which is
then mapped into `[min, max]` by the shared transform. With `ratio=` set the
transformed integer is scaled into a decimal before formatting, which is how
templates produce prices and rates in a range matching their integer keys.
*/

use std::io::Write;

use crate::core::GenError;
use crate::numfmt::DecimalFormat;
use crate::segment::common::{warn_unrecognized, DecodeError, Distribution, SegmentCore};
use crate::vars::VarTable;

#[derive(Debug)]
pub struct Value {
    core: SegmentCore,
    format: DecimalFormat,
    /// Decimal scale; presence switches output to floating point.
    ratio: Option<f32>,
    /// Serial counter, advanced on every generate regardless of order.
    count: i64,
}

impl Value {
    /// Builds a value segment from an instruction argument list. `Ok(None)`
    /// means the segment was rejected and should be left out of the tree.
    pub fn from_args(
        args: &str,
        id: u32,
        vars: &mut VarTable,
    ) -> Result<Option<Self>, DecodeError> {
        let mut core = SegmentCore::new("value", id);
        let Some(extras) = core.decode_args(args, vars)? else {
            return Ok(None);
        };
        let mut format = DecimalFormat::default();
        let mut ratio = None;
        for (key, value) in &extras {
            match key.as_str() {
                "format" => format = DecimalFormat::new(value),
                "ratio" => ratio = value.parse::<f32>().ok(),
                _ => {
                    warn_unrecognized("value", key, value);
                    return Ok(None);
                }
            }
        }
        core.coerce_bounds();
        core.init_zipf(core.zipf_limit());
        Ok(Some(Self {
            core,
            format,
            ratio,
            count: 0,
        }))
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn generate(
        &mut self,
        context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        let raw = match self.core.dist {
            Distribution::Context => context,
            Distribution::Serial => self.count,
            Distribution::Random => self.core.uniform_long(),
            Distribution::Zipf => self.core.zipf_next(),
            Distribution::Log => self.core.log_decay(),
        };
        let value = self.core.transform(raw);
        self.count += 1;

        let rendered = match self.ratio {
            Some(ratio) => self.format.format_f64((value as f32 * ratio) as f64),
            None => self.format.format_i64(value),
        };
        self.core.save(vars, &rendered);
        self.core.write_bytes(out, rendered.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(args: &str) -> Value {
        let mut vars = VarTable::new();
        Value::from_args(args, 0, &mut vars).unwrap().unwrap()
    }

    fn render(value: &mut Value, context: i64, vars: &mut VarTable) -> String {
        let mut out = Vec::new();
        value.generate(context, vars, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn context_order_echoes_context() {
        let mut value = build("order=context");
        let mut vars = VarTable::new();
        assert_eq!(render(&mut value, 42, &mut vars), "42");
    }

    #[test]
    fn serial_order_counts_up() {
        let mut value = build("order=serial max=3 format=#0");
        let mut vars = VarTable::new();
        assert_eq!(render(&mut value, 0, &mut vars), "0");
        assert_eq!(render(&mut value, 0, &mut vars), "1");
        assert_eq!(render(&mut value, 0, &mut vars), "2");
        // Range wraps: (3 * 1) mod 4 = 3, then 0 again.
        assert_eq!(render(&mut value, 0, &mut vars), "3");
        assert_eq!(render(&mut value, 0, &mut vars), "0");
    }

    #[test]
    fn ratio_produces_decimals() {
        let mut value = build("order=context ratio=0.5 format=#0.00");
        let mut vars = VarTable::new();
        assert_eq!(render(&mut value, 7, &mut vars), "3.50");
    }

    #[test]
    fn save_writes_variable() {
        let mut value = build("order=context save=key format=000");
        let mut vars = VarTable::new();
        assert_eq!(render(&mut value, 9, &mut vars), "009");
        assert_eq!(vars.get("key"), "009");
    }

    #[test]
    fn unknown_attribute_rejects_segment() {
        let mut vars = VarTable::new();
        assert!(Value::from_args("orderr=serial", 0, &mut vars)
            .unwrap()
            .is_none());
    }

    #[test]
    fn random_order_stays_in_range() {
        let mut value = build("order=random min=10 max=20");
        let mut vars = VarTable::new();
        for _ in 0..200 {
            let n: i64 = render(&mut value, 0, &mut vars).parse().unwrap();
            assert!((10..=20).contains(&n), "{} out of range", n);
        }
    }
}
