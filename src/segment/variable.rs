/*!
# Variable Segments

Two instruction forms share the `gen.variable` kind:

```text
<?gen.variable name=VVV default=DDD increment=II ?>
<?gen.variable source=SSS ?>
```

The named form reads variable `VVV` at generate time, seeding it with the
default at parse time if nothing has set it yet. With `increment=` the read
value is parsed as an integer and bumped before emission; a non-numeric value
instead gets a running counter appended, so identifiers like `user` become
`user1`, `user2`, ...

The `source=` form is a bulk load: the spec (`none`, `{k=v,...}` or a
properties file path) is applied to the variables table during parsing and
the segment itself is dropped from the tree.
*/

use std::io::Write;

use tracing::warn;

use crate::core::GenError;
use crate::segment::common::{warn_unrecognized, DecodeError, SegmentCore};
use crate::vars::VarTable;

const DEFAULT_VALUE: &str = "DFLT";

#[derive(Debug)]
pub struct Variable {
    core: SegmentCore,
    increment: Option<i64>,
    /// Counter appended when the variable's value is not numeric.
    non_numeric_base: i64,
}

impl Variable {
    pub fn from_args(
        args: &str,
        id: u32,
        vars: &mut VarTable,
    ) -> Result<Option<Self>, DecodeError> {
        let mut core = SegmentCore::new("variable", id);
        let Some(extras) = core.decode_args(args, vars)? else {
            return Ok(None);
        };
        let mut default = DEFAULT_VALUE.to_string();
        let mut increment = None;
        let mut source = None;
        for (key, value) in &extras {
            match key.as_str() {
                "default" => default = value.clone(),
                "increment" => increment = Some(core.int_param(value, 1, vars)),
                "source" => source = Some(value.clone()),
                _ => {
                    warn_unrecognized("variable", key, value);
                    return Ok(None);
                }
            }
        }
        if core.named {
            if vars.get(&core.name).is_empty() {
                vars.set(&core.name, default);
            }
            Ok(Some(Self {
                core,
                increment,
                non_numeric_base: 0,
            }))
        } else if let Some(source) = source {
            // Bulk definition: load the variables now, keep nothing in the tree.
            vars.apply_spec(&source);
            Ok(None)
        } else {
            warn!("variable instruction needs either name= or source=");
            Ok(None)
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn generate(
        &mut self,
        _context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        let current = vars.get(&self.core.name).to_string();
        let rendered = match self.increment {
            Some(step) => match current.parse::<i64>() {
                Ok(number) => (number + step).to_string(),
                Err(_) => {
                    self.non_numeric_base += step;
                    format!("{}{}", current, self.non_numeric_base)
                }
            },
            None => current,
        };
        self.core.write_bytes(out, rendered.as_bytes())
    }
}
