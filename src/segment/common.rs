/*!
# Shared Segment State

Every segment variant embeds a [`SegmentCore`]: the auto-assigned id, the
(possibly defaulted) name, the `order=` distribution, the `[min, max]` range
with its multiplier, the optional `save=` variable, and the lazily created
random generators. The core also owns the shared half of argument decoding,
so variant constructors only deal with their own attributes.

Common attributes handled here: `name`, `order`, `count`, `min`, `max`,
`factor`, `range` (the `AtoBbyC` shorthand) and `save`. Integer attribute
values may be literals or `$`-expressions: `$RANDOM` draws a fresh uniform
integer below `DEFAULT_MAX`, `$ZIPF` draws from the segment's Zipf generator,
and any other `$NAME` looks the variable up, falling back to the supplied
default when unset or unparsable.
*/

use std::io::Write;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use crate::core::{GenError, DEFAULT_MAX, DEFAULT_ZIPF, DEFAULT_ZIPF_MAX};
use crate::stats::{seeded_rng, ZipfGenerator};
use crate::vars::VarTable;

/// Statistical distribution selecting the raw integer for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Values increment from zero, one per generate call.
    Serial,
    /// Uniform draw from the segment's range.
    Random,
    /// Zipf power-law draw.
    Zipf,
    /// The context number passed in by the enclosing block.
    Context,
    /// Count of consecutive divisibility hits; heavy tail near zero.
    Log,
}

/// Decoding failures that abort the whole parse (as opposed to recoverable
/// problems, which reject just the offending segment). The parser attaches
/// the template offset before surfacing these.
pub(crate) type DecodeError = String;

/// Fields and behavior common to all configurable segments.
#[derive(Debug)]
pub struct SegmentCore {
    pub id: u32,
    pub name: String,
    /// True when the template supplied an explicit `name=`.
    pub named: bool,
    pub dist: Distribution,
    pub min: i64,
    pub max: i64,
    pub factor: i64,
    pub log_base: i64,
    pub save_var: Option<String>,
    rng: Option<StdRng>,
    zipf: Option<ZipfGenerator>,
}

impl SegmentCore {
    /// Creates a core with the given kind tag and compilation-unique id.
    /// The default name is `<kind><id>`, which seeds the uniform stream when
    /// no explicit `name=` is given.
    pub fn new(kind: &str, id: u32) -> Self {
        Self {
            id,
            name: format!("{}{}", kind, id),
            named: false,
            dist: Distribution::Context,
            min: 0,
            max: DEFAULT_MAX,
            factor: 1,
            log_base: 10,
            save_var: None,
            rng: None,
            zipf: None,
        }
    }

    /// Decodes the shared attributes of an argument list, in template order.
    ///
    /// Returns the variant-specific pairs that remain, in their original
    /// order, or `None` if the segment must be rejected (already logged).
    /// A pair without `=` is a fatal parse error.
    pub fn decode_args(
        &mut self,
        args: &str,
        vars: &VarTable,
    ) -> Result<Option<Vec<(String, String)>>, DecodeError> {
        let mut extras = Vec::new();
        for pair in args.split_whitespace() {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value in argument {:?}", pair))?;
            if key.is_empty() || value.is_empty() {
                return Err(format!("must specify both key and value in {:?}", pair));
            }
            let key = key.to_lowercase();
            match key.as_str() {
                "name" => {
                    self.name = value.to_string();
                    self.named = true;
                }
                "order" => self.decode_order(value),
                "count" => {
                    self.max = self.int_param(value, 1, vars);
                    self.min = self.max;
                }
                "min" => self.min = self.int_param(value, 0, vars),
                "max" => self.max = self.int_param(value, DEFAULT_MAX, vars),
                "factor" => self.factor = self.int_param(value, 0, vars),
                "range" => {
                    if !self.decode_range(value, vars) {
                        return Ok(None);
                    }
                }
                "save" => self.save_var = Some(value.to_string()),
                _ => extras.push((key, value.to_string())),
            }
        }
        Ok(Some(extras))
    }

    fn decode_order(&mut self, value: &str) {
        let lower = value.to_lowercase();
        self.dist = match lower.as_str() {
            "serial" => Distribution::Serial,
            "random" => Distribution::Random,
            "zipf" => Distribution::Zipf,
            "context" => Distribution::Context,
            _ if lower.starts_with("log") => {
                let base: i64 = lower[3..].parse().unwrap_or(10);
                self.log_base = if base >= 2 {
                    base
                } else {
                    warn!("order={} has unusable base, using 10", value);
                    10
                };
                Distribution::Log
            }
            _ => {
                warn!("unknown order value {:?}, keeping current order", value);
                self.dist
            }
        };
    }

    /// Decodes `range=AtoBbyC` into min/max/factor. Returns false when the
    /// shorthand is malformed and the segment should be dropped.
    fn decode_range(&mut self, value: &str, vars: &VarTable) -> bool {
        let lower = value.to_lowercase();
        let Some(to) = lower.find("to").filter(|&p| p > 0) else {
            warn!("range option requires keyword 'to': {}", value);
            return false;
        };
        self.min = self.int_param(&lower[..to], 0, vars);
        match lower.find("by").filter(|&p| p > to) {
            Some(by) => {
                self.max = self.int_param(&lower[to + 2..by], 1, vars);
                self.factor = self.int_param(&lower[by + 2..], 0, vars);
            }
            None => self.max = self.int_param(&lower[to + 2..], 0, vars),
        }
        true
    }

    /// Clamps decoded bounds into a usable state: `max` is pulled up to keep
    /// the range valid and `factor` is at least 1.
    pub fn coerce_bounds(&mut self) {
        if self.max < self.min {
            self.max = self.min + 1;
        }
        if self.factor < 1 {
            self.factor = 1;
        }
    }

    /// Converts an integer attribute value, expanding `$` expressions.
    pub fn int_param(&mut self, value: &str, default: i64, vars: &VarTable) -> i64 {
        let text = match value.strip_prefix('$') {
            Some(var) => {
                if var.eq_ignore_ascii_case("random") {
                    return self.random_int(DEFAULT_MAX);
                }
                if var.eq_ignore_ascii_case("zipf") {
                    return self.zipf_next();
                }
                let resolved = vars.get(var);
                if resolved.is_empty() {
                    return default;
                }
                resolved.to_string()
            }
            None => value.to_string(),
        };
        text.trim().parse::<i64>().map(i64::abs).unwrap_or(default)
    }

    /// The segment's uniform generator, created on first use from the base
    /// seed plus the name hash.
    pub fn rng(&mut self) -> &mut StdRng {
        if self.rng.is_none() {
            self.rng = Some(seeded_rng(&self.name));
        }
        self.rng.as_mut().expect("rng initialized above")
    }

    /// Uniform integer in `[0, modulus)`.
    pub fn random_int(&mut self, modulus: i64) -> i64 {
        self.rng().gen_range(0..modulus.max(1))
    }

    /// Uniform integer in `[0, max)`, or `min` when the range is a point.
    pub fn uniform_long(&mut self) -> i64 {
        if self.min == self.max {
            self.min
        } else {
            let max = self.max.max(1);
            self.rng().gen_range(0..max)
        }
    }

    /// Count of consecutive divisibility hits: each round multiplies the
    /// divisor by `log_base` and tests a fresh uniform draw, stopping on the
    /// first miss. The result decays roughly by a factor of `log_base` per
    /// step, leaving most of the mass at zero.
    pub fn log_decay(&mut self) -> i64 {
        let mut result = 0;
        let mut divisor = 1i64;
        loop {
            divisor = divisor.wrapping_mul(self.log_base);
            if divisor == 0 {
                break;
            }
            let draw: i64 = self.rng().gen();
            if draw % divisor == 0 {
                result += 1;
            } else {
                break;
            }
        }
        result
    }

    /// Next Zipf draw, creating the generator over `zipf_limit()` elements
    /// on first use.
    pub fn zipf_next(&mut self) -> i64 {
        if self.zipf.is_none() {
            let limit = self.zipf_limit();
            self.zipf = Some(ZipfGenerator::new(limit));
        }
        self.zipf.as_mut().expect("zipf initialized above").next()
    }

    /// Element count for this segment's Zipf generator, clamped to the
    /// engine-wide ceiling; an empty range falls back to `DEFAULT_ZIPF`.
    pub fn zipf_limit(&self) -> i64 {
        if self.max - self.min > 0 {
            (self.max - self.min).min(DEFAULT_ZIPF_MAX)
        } else {
            DEFAULT_ZIPF
        }
    }

    /// Eagerly installs the Zipf generator over `limit` elements when this
    /// segment's order is zipf. Variants with their own notion of range
    /// (word lists) pass their element count here.
    pub fn init_zipf(&mut self, limit: i64) {
        if self.dist == Distribution::Zipf && self.zipf.is_none() {
            self.zipf = Some(ZipfGenerator::new(limit));
        }
    }

    /// Maps a raw integer into the segment's range:
    /// `(value * factor) mod (max - min + 1) + min`, or `min` when the range
    /// is a point. Multiplication wraps like the benchmark templates expect.
    pub fn transform(&self, value: i64) -> i64 {
        if self.min == self.max {
            self.min
        } else {
            value.wrapping_mul(self.factor) % (self.max - self.min + 1) + self.min
        }
    }

    /// Applies the `save=` attribute, if configured.
    pub fn save(&self, vars: &mut VarTable, value: &str) {
        if let Some(key) = &self.save_var {
            vars.set(key, value);
        }
    }

    /// Writes a byte slice, tagging any sink failure with this segment's
    /// name, and reports the exact count written.
    pub fn write_bytes(&self, out: &mut dyn Write, bytes: &[u8]) -> Result<u64, GenError> {
        out.write_all(bytes).map_err(|source| GenError::Write {
            segment: self.name.clone(),
            source,
        })?;
        Ok(bytes.len() as u64)
    }
}

/// Logs and consumes an attribute no variant recognizes. Callers reject the
/// segment after this.
pub(crate) fn warn_unrecognized(kind: &str, key: &str, value: &str) {
    warn!("{}: unrecognized parameter: {}={}", kind, key, value);
}
