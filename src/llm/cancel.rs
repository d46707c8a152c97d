//! Cooperative cancellation for in-flight chat requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// A shared cancellation signal.
///
/// Clones observe the same state. Cancelling is idempotent and wakes every
/// task currently awaiting [`CancellationToken::cancelled`].
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Triggers cancellation.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Resolves once the token has been cancelled.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a concurrent cancel
        // between the check and the await is not lost.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Returns `true` when both handles share the same underlying signal.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Resolves when the primary token or the optional secondary token fires.
pub(crate) async fn either_cancelled(
    primary: Option<&CancellationToken>,
    secondary: Option<&CancellationToken>,
) {
    match (primary, secondary) {
        (Some(a), Some(b)) => {
            tokio::select! {
                () = a.cancelled() => {}
                () = b.cancelled() => {}
            }
        }
        (Some(token), None) | (None, Some(token)) => token.cancelled().await,
        (None, None) => std::future::pending().await,
    }
}
