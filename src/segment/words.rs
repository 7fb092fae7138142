/*!
# Words Segments

`<?gen.words min=N max=M order=OOO source=SSS wrap=W save=VVV ?>`

Emits a run of words drawn from a word list, separated by single spaces with
a newline every `wrap` words (default 14). The number of words per call is
the transformed uniform draw, so `count=N` gives exactly N words while
`min=`/`max=` gives a random count. Word selection follows the segment's
order: zipf (the default, word frequency falls off power-law), serial
(cycles the list), random, or context.

The list itself comes from the process-wide cache in [`crate::wordlist`];
see that module for the `source=` forms.
*/

use std::io::Write;
use std::sync::Arc;

use crate::core::GenError;
use crate::segment::common::{warn_unrecognized, DecodeError, Distribution, SegmentCore};
use crate::vars::VarTable;
use crate::wordlist::{self, WordList};

/// Default maximum word count when the instruction gives no range.
const DEFAULT_WORD_COUNT: i64 = 100;

/// Default wrap width: a newline replaces the space after every 14th word.
const DEFAULT_WRAP: usize = 14;

#[derive(Debug)]
pub struct Words {
    core: SegmentCore,
    list: Arc<WordList>,
    /// Serial cursor; advances one slot per emitted word.
    cursor: usize,
    wrap: usize,
    /// Reused output buffer, so a hot segment allocates once.
    buf: Vec<u8>,
}

impl Words {
    pub fn from_args(
        args: &str,
        id: u32,
        vars: &mut VarTable,
    ) -> Result<Option<Self>, DecodeError> {
        let mut core = SegmentCore::new("words", id);
        core.dist = Distribution::Zipf;
        core.max = DEFAULT_WORD_COUNT;
        let Some(extras) = core.decode_args(args, vars)? else {
            return Ok(None);
        };
        let mut source = None;
        let mut wrap = DEFAULT_WRAP;
        for (key, value) in &extras {
            match key.as_str() {
                "source" => source = Some(value.clone()),
                "wrap" => match value.parse::<usize>() {
                    Ok(w) if w > 0 => wrap = w,
                    _ => tracing::warn!("words: invalid wrap value {:?}, using {}", value, wrap),
                },
                _ => {
                    warn_unrecognized("words", key, value);
                    return Ok(None);
                }
            }
        }
        core.coerce_bounds();
        let source = source.unwrap_or_else(|| "WordList.txt".to_string());
        let list = wordlist::resolve(&source, core.rng());
        core.init_zipf(list.len() as i64);
        Ok(Some(Self {
            core,
            list,
            cursor: 0,
            wrap,
            buf: Vec::new(),
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
        let len = self.list.len();
        let draw = self.core.uniform_long();
        let num_words = self.core.transform(draw).max(0) as usize;

        self.buf.clear();
        for i in 0..num_words {
            let index = match self.core.dist {
                Distribution::Random => self.core.random_int(len as i64) as usize,
                Distribution::Zipf => self.core.zipf_next() as usize % len,
                Distribution::Context => context.rem_euclid(len as i64) as usize,
                _ => self.cursor % len,
            };
            self.buf.extend_from_slice(&self.list[index]);
            self.cursor += 1;
            if i + 1 < num_words {
                if i % self.wrap == self.wrap - 1 {
                    self.buf.push(b'\n');
                } else {
                    self.buf.push(b' ');
                }
            }
        }
        if self.core.save_var.is_some() {
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            self.core.save(vars, &text);
        }
        self.core.write_bytes(out, &self.buf)
    }
}
