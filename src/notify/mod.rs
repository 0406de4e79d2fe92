use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::{Bus, BusError, Frame};

mod reader;
mod trace;

pub use reader::BufferedReader;
pub use trace::TraceLog;

const RECV_RETRY: Duration = Duration::from_millis(50);

/// The closed set of frame observers the dispatcher fans out to.
pub enum Listener {
    /// Plain callback, invoked inline on the dispatch task.
    Callback(Box<dyn FnMut(&Frame) + Send>),
    /// Feeds a [`BufferedReader`]; every frame is buffered, none dropped.
    Buffered(UnboundedSender<Frame>),
    /// Appends one trace line per frame to a file.
    Trace(Box<TraceLog>),
}

impl Listener {
    pub fn callback(f: impl FnMut(&Frame) + Send + 'static) -> Self {
        Self::Callback(Box::new(f))
    }

    pub fn trace(sink: TraceLog) -> Self {
        Self::Trace(Box::new(sink))
    }

    pub(crate) fn frame_observed(&mut self, frame: &Frame) {
        match self {
            Self::Callback(f) => f(frame),
            Self::Buffered(tx) => {
                if tx.send(*frame).is_err() {
                    log::debug!("frame reader dropped, discarding {frame}");
                }
            }
            Self::Trace(sink) => {
                if let Err(e) = sink.append(frame) {
                    log::warn!("frame trace write failed: {e}");
                }
            }
        }
    }
}

/// Fans every frame received on the bus out to the registered
/// listeners, in registration order, until stopped.
pub struct Notifier {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Notifier {
    pub fn start(bus: Arc<dyn Bus>, listeners: Vec<Listener>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(dispatch(bus, listeners, token));
        Self { cancel, task }
    }

    /// Halt delivery and drop the listeners.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

async fn dispatch(bus: Arc<dyn Bus>, mut listeners: Vec<Listener>, cancel: CancellationToken) {
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = bus.recv() => match received {
                Ok(frame) => frame,
                Err(BusError::Closed) => {
                    log::info!("bus closed, notifier exiting");
                    break;
                }
                Err(e) => {
                    log::warn!("receive failed: {e}, retrying");
                    tokio::time::sleep(RECV_RETRY).await;
                    continue;
                }
            },
        };
        for listener in &mut listeners {
            listener.frame_observed(&frame);
        }
    }
}
