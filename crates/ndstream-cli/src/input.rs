/// Input selection shared by every subcommand.
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncRead;

/// Any readable byte source the decoder can pull from.
pub type Input = Box<dyn AsyncRead + Unpin + Send>;

/// Opens `path` for reading, or stdin when `path` is `None` or `-`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn open(path: Option<&Path>) -> Result<Input> {
    match path {
        None => Ok(Box::new(tokio::io::stdin())),
        Some(p) if p == Path::new("-") => Ok(Box::new(tokio::io::stdin())),
        Some(p) => {
            let file = tokio::fs::File::open(p)
                .await
                .with_context(|| format!("cannot open {}", p.display()))?;
            Ok(Box::new(file))
        }
    }
}

/// Human-readable name of the input for error messages.
pub fn describe(path: Option<&Path>) -> String {
    match path {
        Some(p) if p != Path::new("-") => p.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}
