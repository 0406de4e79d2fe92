use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::bus::{Bus, Frame};
use crate::command::{CommandProcessor, CommandQueue};
use crate::notify::{BufferedReader, Listener, Notifier};
use crate::pipe::CommandPipe;
use crate::router::FrameRouter;

/// First frame sent after the settle delay, announcing the responder.
const PROBE_ID: u32 = 0x1001;

const DEFAULT_PIPE_PATH: &str = "/tmp/can_commands";
const DEFAULT_SETTLE: Duration = Duration::from_secs(3);
const DEFAULT_PACE: Duration = Duration::from_millis(100);
const DEFAULT_RETRY: Duration = Duration::from_millis(500);
const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(5);

pub struct ResponderBuilder {
    bus: Arc<dyn Bus>,
    listeners: Vec<Listener>,
    pipe_path: PathBuf,
    settle: Duration,
    pace: Duration,
    retry: Duration,
    drain_grace: Duration,
}

impl ResponderBuilder {
    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn pipe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipe_path = path.into();
        self
    }

    /// Delay between startup and the probe frame, letting the link settle.
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Pause between two processed commands.
    pub fn pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Interval before the command pipe is reopened.
    pub fn retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    /// Upper bound on waiting for queued commands during shutdown.
    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    pub fn build(self) -> Responder {
        Responder {
            bus: self.bus,
            listeners: self.listeners,
            pipe_path: self.pipe_path,
            settle: self.settle,
            pace: self.pace,
            retry: self.retry,
            drain_grace: self.drain_grace,
        }
    }
}

/// Owns the bus handle for the lifetime of a run: starts the
/// notification dispatcher, the frame router, the pipe command source
/// and the command processor, then drives the orderly shutdown once the
/// cancellation token fires.
pub struct Responder {
    bus: Arc<dyn Bus>,
    listeners: Vec<Listener>,
    pipe_path: PathBuf,
    settle: Duration,
    pace: Duration,
    retry: Duration,
    drain_grace: Duration,
}

impl Responder {
    pub fn builder(bus: Arc<dyn Bus>) -> ResponderBuilder {
        ResponderBuilder {
            bus,
            listeners: Vec::new(),
            pipe_path: DEFAULT_PIPE_PATH.into(),
            settle: DEFAULT_SETTLE,
            pace: DEFAULT_PACE,
            retry: DEFAULT_RETRY,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Runs until `cancel` fires. Returns once every task has stopped
    /// and the dispatcher is shut down; the bus handle itself is
    /// released when its last `Arc` drops, on every exit path.
    pub async fn run(self, cancel: CancellationToken) {
        let Responder {
            bus,
            mut listeners,
            pipe_path,
            settle,
            pace,
            retry,
            drain_grace,
        } = self;

        let (frames, frame_listener) = BufferedReader::new();
        listeners.push(frame_listener);
        let notifier = Notifier::start(Arc::clone(&bus), listeners);

        log::info!("starting up, settling for {settle:?}");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(settle) => {}
        }
        if cancel.is_cancelled() {
            notifier.stop().await;
            return;
        }
        log::info!("running");

        match Frame::new(PROBE_ID, &[]) {
            Ok(probe) => {
                if let Err(e) = bus.send(probe).await {
                    log::error!("startup probe send failed: {e}");
                }
            }
            Err(e) => log::error!("startup probe rejected: {e}"),
        }

        let (queue, consumer) = CommandQueue::channel();
        let producer_cancel = cancel.child_token();
        let processor_cancel = CancellationToken::new();

        let router = FrameRouter::new(frames, Arc::clone(&bus), queue.clone());
        let source = CommandPipe::new(pipe_path, queue.clone(), retry);
        let processor = CommandProcessor::new(consumer, Arc::clone(&bus), pace);

        let router_task = tokio::spawn(router.run(producer_cancel.clone()));
        let source_task = tokio::spawn(source.run(producer_cancel.clone()));
        let processor_task = tokio::spawn(processor.run(processor_cancel.clone()));

        cancel.cancelled().await;
        log::info!("shutdown requested");

        // Producers stop first; the processor then drains what was
        // already queued, bounded by the grace period.
        let _ = tokio::join!(router_task, source_task);
        tokio::select! {
            _ = queue.join() => {}
            _ = tokio::time::sleep(drain_grace) => {
                log::warn!("queue drain exceeded {drain_grace:?}, abandoning remaining commands");
            }
        }
        processor_cancel.cancel();
        let _ = processor_task.await;
        notifier.stop().await;
        log::info!("responder stopped");
    }
}
