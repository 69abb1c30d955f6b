/// Implementation of `ndstream validate`.
///
/// Decodes the whole input with `StreamingDecoder`, discarding values,
/// and prints every diagnostic the moment its line is reached. The
/// command exits with code 1 if any line was malformed or oversized
/// (the main dispatcher converts `Err` to exit code 1).
///
/// # Output
///
/// ```text
/// line 1: expected value at line 1 column 1
/// line 3: EOF while parsing an object at line 1 column 7
/// ✗ 5 lines, 3 records, 2 malformed
/// ```
///
/// A clean input prints only the summary, with `✓`.
use anyhow::{Context, Result, bail};
use ndstream_decoder::{DecodeStats, ParseDiagnostic, StreamingDecoder};
use serde_json::Value;

use crate::ValidateArgs;
use crate::input;

/// Run the `ndstream validate` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, or if any
/// line failed to decode.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let path = args.decoder.file.as_deref();
    let config = args.decoder.config();
    let reader = input::open(path).await?;

    let print = |diagnostic: ParseDiagnostic| println!("{diagnostic}");
    let mut decoder = StreamingDecoder::<_, Value, _>::with_sink(reader, &config, print);
    while let Some(item) = decoder.next().await {
        item.with_context(|| format!("failed to read {}", input::describe(path)))?;
    }

    let stats = decoder.stats();
    println!("{}", summary(&stats));

    if stats.diagnostics > 0 {
        bail!("{} malformed line(s)", stats.diagnostics);
    }
    Ok(())
}

/// One-line summary of a finished decode.
fn summary(stats: &DecodeStats) -> String {
    let mark = if stats.diagnostics == 0 { '✓' } else { '✗' };
    format!(
        "{mark} {} line{}, {} record{}, {} malformed",
        stats.lines,
        if stats.lines == 1 { "" } else { "s" },
        stats.records,
        if stats.records == 1 { "" } else { "s" },
        stats.diagnostics
    )
}
