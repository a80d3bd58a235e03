use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
    Deadline,
    Cancel,
}

impl Display for CancelReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "Deadline"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

struct RawContext {
    // Dropping the last clone of this sender is what resolves
    // `Handler::done`, so the handler can wait for all holders to go away.
    _sender: oneshot::Sender<()>,
    deadline: Option<Instant>,
    cancel_receiver: broadcast::Receiver<()>,
}

impl RawContext {
    #[must_use]
    fn new(deadline: Option<Instant>) -> (Self, Handler) {
        let (sender, recv) = oneshot::channel();
        let (cancel_sender, cancel_receiver) = broadcast::channel(1);

        (
            Self {
                _sender: sender,
                deadline,
                cancel_receiver,
            },
            Handler { recv, cancel_sender },
        )
    }

    async fn done(&self) -> CancelReason {
        let mut recv = self.cancel_receiver.resubscribe();

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
                    _ = recv.recv() => CancelReason::Cancel,
                }
            }
            None => {
                let _ = recv.recv().await;
                CancelReason::Cancel
            }
        }
    }
}

pub struct Handler {
    recv: oneshot::Receiver<()>,
    cancel_sender: broadcast::Sender<()>,
}

impl Handler {
    /// Waits until every clone of the context has been dropped.
    pub async fn done(&mut self) {
        let _ = (&mut self.recv).await;
    }

    /// Cancels the context and waits for all holders to drop it.
    pub async fn cancel(self) {
        drop(self.cancel_sender);

        let _ = self.recv.await;
    }
}

#[derive(Clone)]
pub struct Context(Arc<RawContext>);

impl From<RawContext> for Context {
    fn from(ctx: RawContext) -> Self {
        Self(Arc::new(ctx))
    }
}

impl Context {
    pub fn new() -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(None);
        (ctx.into(), handler)
    }

    pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(Some(deadline));
        (ctx.into(), handler)
    }

    pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub async fn done(&self) -> CancelReason {
        self.0.done().await
    }
}
