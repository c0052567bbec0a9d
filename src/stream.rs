//! Streaming batch API: emit each document's result as soon as it is done.
//!
//! Unlike the eager [`crate::convert::convert_dir`], which returns only after
//! every document has been attempted, [`convert_dir_stream`] yields
//! [`DocumentResult`] items one by one. Documents are processed strictly
//! sequentially, so results arrive in discovery (file name) order.

use crate::config::ConversionConfig;
use crate::convert::{prepare_batch, process_document};
use crate::error::TimetableError;
use crate::output::DocumentResult;
use crate::pipeline::input;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Convert every `.docx` in `dir`, streaming results as they are ready.
///
/// `on_batch_start` fires before this returns; `on_batch_complete` is not
/// fired, since the caller decides when the stream is finished.
///
/// # Returns
/// - `Ok(DocumentStream)` — one item per discovered document
/// - `Err(TimetableError)` — `dir` cannot be listed, or no font is available
///
/// # Example
/// ```rust,no_run
/// use timetable2png::{convert_dir_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let mut stream = convert_dir_stream("test_cases", &config)?;
/// while let Some(doc) = stream.next().await {
///     match (&doc.output, &doc.error) {
///         (Some(out), _) => println!("{}: {} groups", out.stem, out.groups),
///         (_, Some(err)) => eprintln!("{err}"),
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_dir_stream(
    dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentStream, TimetableError> {
    let dir = dir.as_ref();
    let paths = input::list_documents(dir)?;
    let config = Arc::new(prepare_batch(config)?);
    let total = paths.len();
    info!("Streaming {} documents from {}", total, dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let s = stream::iter(paths.into_iter().enumerate()).then(move |(i, path)| {
        let cfg = Arc::clone(&config);
        async move { process_document(i + 1, total, path, &cfg).await }
    });

    Ok(Box::pin(s))
}
