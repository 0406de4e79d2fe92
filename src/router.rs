use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::bus::{Bus, Frame};
use crate::command::{Command, CommandQueue};
use crate::notify::BufferedReader;

/// Frames with this id are answered in reflex with a copy carrying the
/// next id.
const BOUNCE_ID: u32 = 20;
/// Frames with this id queue a canned send command instead.
const TRIGGER_ID: u32 = 10;
const TRIGGER_COMMAND: &str = "send 0x200 7 6";

/// Watches bus traffic and reacts per arbitration id: a direct send for
/// the immediate bounce reflex, a queued command for triggered actions.
/// Both checks run on every frame.
pub struct FrameRouter {
    frames: BufferedReader,
    bus: Arc<dyn Bus>,
    queue: CommandQueue,
}

impl FrameRouter {
    pub fn new(frames: BufferedReader, bus: Arc<dyn Bus>, queue: CommandQueue) -> Self {
        Self { frames, bus, queue }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        log::info!("frame router started");
        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                buffered = self.frames.next_frame() => match buffered {
                    Some(frame) => frame,
                    None => break,
                },
            };
            self.route(&frame).await;
        }
        log::info!("frame router stopped");
    }

    async fn route(&self, frame: &Frame) {
        if frame.id() == BOUNCE_ID {
            self.bounce(frame).await;
        }
        if frame.id() == TRIGGER_ID {
            log::debug!("trigger frame {frame}, queueing {TRIGGER_COMMAND:?}");
            self.queue.push(Command::new(TRIGGER_COMMAND));
        }
    }

    async fn bounce(&self, frame: &Frame) {
        let reply = match frame.with_id(frame.id() + 1) {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("cannot derive bounce reply from {frame}: {e}");
                return;
            }
        };
        match self.bus.send(reply).await {
            Ok(()) => {
                log::info!("bounced {frame} as {reply}");
                self.queue.push(Command::new(format!("bounced {reply}")));
            }
            Err(e) => log::error!("bounce send failed for {frame}: {e}"),
        }
    }
}
