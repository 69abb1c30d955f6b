/// Implementation of `ndstream decode`.
///
/// Wraps the input in a chunk stream (`ReaderStream`) and feeds it through
/// `ndstream_decoder::decode`. Decoded values are written to stdout as
/// they become available:
///
/// ```text
///   input ──► ReaderStream ──► NdjsonStream ──► ready_chunks(batch) ──► stdout
///                                   │
///                                   └── diagnostics ──► LogSink (stderr)
/// ```
///
/// `ready_chunks` groups only values that are already decoded, so a slow
/// producer never delays output waiting for a full batch. Stdout is
/// flushed once per batch.
use std::io::{self, BufWriter, Write as _};

use anyhow::{Context, Result};
use futures::StreamExt;
use ndstream_decoder::decode;
use serde_json::Value;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::DecodeArgs;
use crate::input;

/// Run the `ndstream decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, or if stdout
/// cannot be written. Malformed lines are not errors.
pub async fn run(args: &DecodeArgs) -> Result<()> {
    let path = args.decoder.file.as_deref();
    let config = args.decoder.config();
    let reader = input::open(path).await?;

    let source = ReaderStream::with_capacity(reader, config.read_buffer_size);
    let mut values = decode::<Value, _>(source, &config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    {
        let mut batches = (&mut values).ready_chunks(args.batch_size.max(1));
        while let Some(batch) = batches.next().await {
            for item in batch {
                let value =
                    item.with_context(|| format!("failed to decode {}", input::describe(path)))?;
                write_value(&mut out, &value, args.pretty)?;
            }
            out.flush().context("cannot write to stdout")?;
        }
    }

    let stats = values.stats();
    info!(
        lines = stats.lines,
        records = stats.records,
        diagnostics = stats.diagnostics,
        "decode finished"
    );

    Ok(())
}

/// Writes one value followed by a newline.
fn write_value(out: &mut impl io::Write, value: &Value, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    }
    .context("cannot write to stdout")?;
    out.write_all(b"\n").context("cannot write to stdout")
}
