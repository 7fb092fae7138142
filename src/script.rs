/*!
# Script Sources

Line-oriented view over a generating template, for harnesses that consume
generated commands one at a time (SQL scripts, query batches). The template
runs on a background thread and streams its bytes through an in-process
pipe; `next_line()` pulls one newline-delimited command at a time, blocking
until the generator has produced it.

The generator side simply streams the tree in order until it is exhausted,
then closes its end of the pipe, which surfaces to the consumer as
end-of-input. If the consumer is dropped early the generator's next write
fails with a broken pipe and the background thread winds down.
*/

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::core::GenError;
use crate::template::Template;

/// Buffered chunks in flight between generator and consumer.
const PIPE_DEPTH: usize = 16;

/// Write half of the in-process pipe.
struct ChannelWriter {
    tx: SyncSender<Vec<u8>>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.tx
            .send(buf.to_vec())
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reader closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Read half of the in-process pipe.
struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    offset: usize,
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.offset >= self.pending.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                // Sender gone: the generator finished (or failed); EOF.
                Err(_) => return Ok(0),
            }
        }
        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

/// A template generating in the background, consumed line by line.
pub struct ScriptSource {
    reader: BufReader<ChannelReader>,
    handle: Option<JoinHandle<Result<u64, GenError>>>,
}

impl ScriptSource {
    /// Compiles `template_path` and starts generating with `client_id` as
    /// the root context. `vars` is a variables spec applied before
    /// generation, typically used to hand each client its own id:
    /// `{clientid=7}`.
    pub fn launch<P: AsRef<Path>>(
        template_path: P,
        client_id: i64,
        vars: &str,
    ) -> Result<Self, GenError> {
        let mut template = Template::parse_file(template_path)?;
        template.set_variables(vars);
        Ok(Self::spawn(template, client_id))
    }

    /// Starts a background generation over an already-compiled template.
    pub fn spawn(mut template: Template, client_id: i64) -> Self {
        let (tx, rx) = sync_channel(PIPE_DEPTH);
        let handle = std::thread::spawn(move || {
            let mut sink = ChannelWriter { tx };
            let result = template.generate(client_id, &mut sink);
            match &result {
                Ok(bytes) => debug!("script generation finished, {} bytes", bytes),
                Err(GenError::Write { .. }) => {
                    debug!("script consumer closed early, generation stopped")
                }
                Err(err) => warn!("script generation failed: {}", err),
            }
            result
        });
        Self {
            reader: BufReader::new(ChannelReader {
                rx,
                pending: Vec::new(),
                offset: 0,
            }),
            handle: Some(handle),
        }
    }

    /// Next newline-delimited line of generated output, without the line
    /// terminator. `None` once the template is exhausted.
    pub fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
            Err(err) => {
                warn!("script read failed: {}", err);
                None
            }
        }
    }

    /// Waits for the generator to finish and reports its byte count.
    /// Draining the remaining lines first avoids blocking on a full pipe.
    pub fn finish(mut self) -> Result<u64, GenError> {
        while self.next_line().is_some() {}
        self.handle
            .take()
            .expect("finish consumes the handle once")
            .join()
            .unwrap_or_else(|_| {
                Err(GenError::Write {
                    segment: "script".to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "generator thread panicked",
                    ),
                })
            })
    }
}
