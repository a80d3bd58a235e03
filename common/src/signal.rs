use std::future::poll_fn;
use std::task::Poll;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Waits for any of a set of unix signals. Signals are polled directly,
/// no background tasks are spawned.
#[derive(Default)]
pub struct SignalHandler {
    signals: Vec<(SignalKind, Signal)>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signal(mut self, kind: SignalKind) -> Self {
        self.signals.push((kind, signal(kind).expect("failed to create signal")));
        self
    }

    /// Resolves with the first registered signal to fire. Pends forever
    /// when no signals are registered.
    pub async fn recv(&mut self) -> SignalKind {
        poll_fn(|cx| {
            for (kind, signal) in self.signals.iter_mut() {
                if let Poll::Ready(Some(())) = signal.poll_recv(cx) {
                    return Poll::Ready(*kind);
                }
            }

            Poll::Pending
        })
        .await
    }
}
