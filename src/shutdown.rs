//! Process termination sink
//!
//! The tracker hands fatal errors to a `ShutdownSignal` instead of
//! recovering. `ShutdownHandle` is the process-level implementation: the
//! first error is latched and wakes whoever is waiting in `wait`.

use crate::error::FatalError;
use tokio::sync::watch;
use tracing::error;

/// Sink for unrecoverable errors.
pub trait ShutdownSignal: Send + Sync {
    fn shutdown_with_error(&self, error: FatalError);
}

/// Watch-channel backed shutdown signal shared by the worker tasks.
#[derive(Debug)]
pub struct ShutdownHandle {
    sender: watch::Sender<Option<FatalError>>,
    receiver: watch::Receiver<Option<FatalError>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self { sender, receiver }
    }

    /// First error received, if any.
    pub fn error(&self) -> Option<FatalError> {
        self.receiver.borrow().clone()
    }

    /// Resolve once a fatal error has been signalled.
    pub async fn wait(&self) -> FatalError {
        let mut receiver = self.receiver.clone();
        loop {
            if let Some(err) = receiver.borrow_and_update().clone() {
                return err;
            }
            if receiver.changed().await.is_err() {
                // Sender lives in self, so this cannot happen while we are borrowed
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal for ShutdownHandle {
    fn shutdown_with_error(&self, err: FatalError) {
        error!("Shutting down: {}", err);
        self.sender.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(err);
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BLOCK_POLLING, TRANSACTION_INITIALIZATION};

    #[tokio::test]
    async fn test_first_error_is_latched() {
        let handle = ShutdownHandle::new();
        assert_eq!(handle.error(), None);

        handle.shutdown_with_error(FatalError::GlobalConfigUnavailable {
            procedure: BLOCK_POLLING,
        });
        handle.shutdown_with_error(FatalError::GlobalConfigUnavailable {
            procedure: TRANSACTION_INITIALIZATION,
        });

        let err = handle.wait().await;
        assert_eq!(err.procedure(), BLOCK_POLLING);
        assert_eq!(handle.error(), Some(err));
    }

    #[tokio::test]
    async fn test_wait_wakes_on_signal() {
        let handle = std::sync::Arc::new(ShutdownHandle::new());
        let signaller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            signaller.shutdown_with_error(FatalError::GlobalConfigUnavailable {
                procedure: BLOCK_POLLING,
            });
        });
        let err = handle.wait().await;
        assert_eq!(
            err.to_string(),
            "TxsScheduler::blockPolling unable to recover global config"
        );
    }
}
