use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Active lifetime of one view. Requests run through it resolve to
/// [`ClientError::Cancelled`] once the view is closed, so late responses never
/// reach view state.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    token: CancellationToken,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lifetime that ends with this one, or earlier if closed on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn closed(&self) {
        self.token.cancelled().await
    }

    /// Runs `request` unless the lifetime ends first. A result that arrives
    /// after closing is dropped.
    pub async fn run<F, T>(&self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_closed() {
            return Err(ClientError::Cancelled);
        }
        let outcome = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            outcome = request => Some(outcome),
        };
        match outcome {
            Some(result) if !self.is_closed() => result,
            _ => {
                debug!("lifetime: discarding response for closed view");
                Err(ClientError::Cancelled)
            }
        }
    }
}
