/*!
# GenXml CLI

Command-line wrapper around the template engine: compiles one template and
writes a batch of generated documents, one file per context number.
*/

use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use genxml::{DecimalFormat, Template};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "genxml",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate structured text documents from a template"
)]
struct Cli {
    /// Input template file
    #[arg(short, long, default_value = "template.gen")]
    template: PathBuf,

    /// Output file path; for batches the document index is inserted before
    /// the final '.'
    #[arg(short, long, default_value = "data/file.xml")]
    out: String,

    /// Number of documents to generate
    #[arg(short, long, default_value_t = 1)]
    num: i64,

    /// Starting document number (also the root context of the first
    /// document)
    #[arg(short, long, default_value_t = 0)]
    start: i64,

    /// Decimal-format pattern for the document index in file names
    /// (default: zero-padded to the width of the last index)
    #[arg(short, long)]
    format: Option<String>,

    /// Initial variables: 'none', '{k=v,...}' or a properties file path
    #[arg(short = 'V', long)]
    vars: Option<String>,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    stats: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct RunStats {
    documents: i64,
    bytes: u64,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("genxml={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let mut template = Template::parse_file(&cli.template)
        .with_context(|| format!("compiling template {}", cli.template.display()))?;
    if let Some(vars) = &cli.vars {
        template.set_variables(vars);
    }

    let index_format = DecimalFormat::new(&match cli.format {
        Some(pattern) => pattern,
        None => "0".repeat(index_width(cli.start, cli.num)),
    });

    let progress = if cli.num > 1 && !cli.quiet {
        let bar = ProgressBar::new(cli.num as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .expect("static progress template"),
        );
        Some(bar)
    } else {
        None
    };

    let started = Instant::now();
    let mut total_bytes = 0u64;
    for doc in cli.start..cli.start + cli.num {
        let out_path = document_path(&cli.out, doc, cli.num, &index_format);
        let file = std::fs::File::create(&out_path)
            .with_context(|| format!("creating output file {}", out_path))?;
        let mut out = BufWriter::new(file);
        total_bytes += template
            .generate(doc, &mut out)
            .with_context(|| format!("generating document {}", doc))?;
        std::io::Write::flush(&mut out)?;
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let elapsed = started.elapsed();
    info!(
        "generated {} document(s), {} bytes in {:.2?}",
        cli.num, total_bytes, elapsed
    );
    if cli.stats {
        let stats = RunStats {
            documents: cli.num,
            bytes: total_bytes,
            elapsed_ms: elapsed.as_millis(),
        };
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

/// Width of the widest document index in this batch.
fn index_width(start: i64, num: i64) -> usize {
    let last = (start + num - 1).max(0);
    last.to_string().len()
}

/// Output path for one document: the verbatim path for a single document
/// starting at zero, otherwise the formatted index lands just before the
/// final `.` (or at the end when the path has no extension).
fn document_path(out: &str, doc: i64, num: i64, format: &DecimalFormat) -> String {
    if doc == 0 && num == 1 {
        return out.to_string();
    }
    let index = format.format_i64(doc);
    match out.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &out[..dot], index, &out[dot..]),
        _ => format!("{}{}", out, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_document_keeps_path() {
        let fmt = DecimalFormat::new("0");
        assert_eq!(document_path("out/file.xml", 0, 1, &fmt), "out/file.xml");
    }

    #[test]
    fn batch_inserts_index_before_extension() {
        let fmt = DecimalFormat::new("00");
        assert_eq!(document_path("out/file.xml", 7, 3, &fmt), "out/file07.xml");
    }

    #[test]
    fn extensionless_path_appends_index() {
        let fmt = DecimalFormat::new("0");
        assert_eq!(document_path("dir/out", 2, 3, &fmt), "dir/out2");
    }

    #[test]
    fn width_covers_last_index() {
        assert_eq!(index_width(0, 1), 1);
        assert_eq!(index_width(0, 10), 1);
        assert_eq!(index_width(0, 11), 2);
        assert_eq!(index_width(10, 2), 2);
        assert_eq!(index_width(995, 10), 4);
    }
}
