/*!
# Decimal Format Patterns

Small formatter for the `format=` attribute of value segments and for the
document-index suffix of batch output files. Patterns follow the familiar
decimal-format conventions used by the templates this engine consumes:

* `#` - digit, omitted when not significant
* `0` - digit, always printed (zero padding)
* `.` - decimal separator

Examples: `#0` (plain integer, the default), `000` (zero-padded to three
digits), `#0.00` (two fixed decimals), `#0.0##` (one to three decimals).
*/

/// A compiled `format=` pattern.
#[derive(Debug, Clone)]
pub struct DecimalFormat {
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
}

/// Pattern applied when a value segment does not specify `format=`.
pub const DEFAULT_FORMAT: &str = "#0";

impl DecimalFormat {
    /// Compiles a pattern. Unknown characters are ignored, so a degenerate
    /// pattern degrades to plain integer output rather than failing.
    pub fn new(pattern: &str) -> Self {
        let (int_part, frac_part) = match pattern.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (pattern, None),
        };
        let min_int = int_part.chars().filter(|&c| c == '0').count().max(1);
        let (min_frac, max_frac) = match frac_part {
            Some(f) => (
                f.chars().filter(|&c| c == '0').count(),
                f.chars().filter(|&c| c == '0' || c == '#').count(),
            ),
            None => (0, 0),
        };
        Self {
            min_int,
            min_frac,
            max_frac,
        }
    }

    /// Formats an integer value.
    pub fn format_i64(&self, value: i64) -> String {
        let sign = if value < 0 { "-" } else { "" };
        let mut out = format!(
            "{}{:0width$}",
            sign,
            value.unsigned_abs(),
            width = self.min_int
        );
        if self.min_frac > 0 {
            out.push('.');
            out.extend(std::iter::repeat('0').take(self.min_frac));
        }
        out
    }

    /// Formats a floating-point value, printing between `min_frac` and
    /// `max_frac` decimals.
    pub fn format_f64(&self, value: f64) -> String {
        if self.max_frac == 0 {
            return self.format_i64(value.round() as i64);
        }
        let sign = if value.is_sign_negative() && value != 0.0 {
            "-"
        } else {
            ""
        };
        let rendered = format!("{:.*}", self.max_frac, value.abs());
        let (int_digits, frac_digits) = rendered.split_once('.').unwrap_or((&rendered, ""));
        let mut frac = frac_digits.trim_end_matches('0').to_string();
        while frac.len() < self.min_frac {
            frac.push('0');
        }
        let mut out = format!("{}{:0>width$}", sign, int_digits, width = self.min_int);
        if !frac.is_empty() {
            out.push('.');
            out.push_str(&frac);
        }
        out
    }
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}
