/*!
# Variables Table

Case-insensitive name/value table shared by every segment of one compiled
template. Keys are folded to lower case on every access; reading an unset key
yields the empty string so templates never fail on a missing variable.

Values arrive from four places, later writers overriding earlier ones:
initial defaults seeded by `gen.variable` declarations at parse time, bulk
loads via `gen.variable source=...`, caller overrides via
`Template::set_variables`, and `save=` writes performed by segments during
generation.
*/

use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Per-tree variables table. Cloning yields an independent snapshot, which is
/// how concurrent generations over copies of one tree stay isolated.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    map: HashMap<String, String>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`, or the empty string if unset.
    pub fn get(&self, key: &str) -> &str {
        self.map
            .get(&key.to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.map.insert(key.to_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Applies a variables spec. Three forms are accepted:
    ///
    /// * `none` - ignored
    /// * `{name1=val1,name2=val2}` - literal list, no embedded whitespace
    /// * anything else - path of a properties file (`key=value` lines,
    ///   `#`/`!` comments)
    ///
    /// Malformed entries and unreadable files are logged and skipped; this
    /// call never fails.
    pub fn apply_spec(&mut self, spec: &str) {
        if spec.eq_ignore_ascii_case("none") {
            return;
        }
        if let Some(body) = spec.strip_prefix('{') {
            let body = match body.strip_suffix('}') {
                Some(inner) => inner,
                None => {
                    warn!("variables spec is missing closing brace: {}", spec);
                    body
                }
            };
            for pair in body.split(',') {
                if pair.is_empty() {
                    continue;
                }
                match pair.split_once('=') {
                    Some((key, value)) => self.set(key, value),
                    None => warn!("illegal variable assignment: {}", pair),
                }
            }
        } else {
            self.load_properties(Path::new(spec));
        }
    }

    /// Loads a properties file into the table, overriding existing keys.
    /// Lines are `key=value`; blank lines and lines starting with `#` or `!`
    /// are ignored.
    pub fn load_properties(&mut self, path: &Path) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!("cannot read variables file {}: {}", path.display(), err);
                return;
            }
        };
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => self.set(key.trim(), value.trim()),
                None => warn!(
                    "skipping malformed line in variables file {}: {}",
                    path.display(),
                    line
                ),
            }
        }
    }
}
