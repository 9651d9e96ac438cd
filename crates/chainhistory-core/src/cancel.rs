//! Cancellation at fetch boundaries.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::HistoryError;
use crate::types::Position;

/// Await `fut` unless `cancel` fires first.
///
/// Cancellation wins ties so a cancelled traversal never starts another fetch.
pub(crate) async fn until_cancelled<F, T>(
    cancel: &CancellationToken,
    at: Position,
    fut: F,
) -> Result<T, HistoryError>
where
    F: Future<Output = Result<T, HistoryError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HistoryError::Cancelled { at }),
        res = fut => res,
    }
}
