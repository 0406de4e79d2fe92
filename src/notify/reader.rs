use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::Listener;
use crate::bus::Frame;

/// Buffers every frame the dispatcher observes and hands them out one
/// at a time. Frames arriving between two `next_frame` calls are kept;
/// no frame is yielded twice.
pub struct BufferedReader {
    rx: UnboundedReceiver<Frame>,
}

impl BufferedReader {
    /// The reader and the listener that feeds it.
    pub fn new() -> (Self, Listener) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, Listener::Buffered(tx))
    }

    /// Next buffered frame; `None` once the dispatcher has stopped.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}
