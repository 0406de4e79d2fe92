use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

use super::Command;

/// Producer handle of the unbounded command funnel. Cloned freely;
/// pushes never block. FIFO is the only ordering guarantee: no
/// priorities, no deduplication.
#[derive(Clone)]
pub struct CommandQueue {
    tx: UnboundedSender<Command>,
    shared: Arc<Shared>,
}

/// Consumer half; exactly one exists per queue.
pub struct CommandConsumer {
    rx: UnboundedReceiver<Command>,
    shared: Arc<Shared>,
}

struct Shared {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl CommandQueue {
    pub fn channel() -> (CommandQueue, CommandConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            outstanding: AtomicUsize::new(0),
            drained: Notify::new(),
        });
        (
            CommandQueue {
                tx,
                shared: Arc::clone(&shared),
            },
            CommandConsumer { rx, shared },
        )
    }

    pub fn push(&self, command: Command) {
        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(command).is_err() {
            // Consumer is gone; only happens while shutting down.
            self.shared.outstanding.fetch_sub(1, Ordering::AcqRel);
            log::debug!("command queue closed, command dropped");
        }
    }

    /// Resolves once every command pushed so far has been acknowledged
    /// with [`CommandConsumer::mark_done`]. Used by the shutdown drain.
    pub async fn join(&self) {
        loop {
            let notified = self.shared.drained.notified();
            if self.shared.outstanding.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl CommandConsumer {
    /// Next command in FIFO order; `None` once every producer is gone.
    pub async fn next(&mut self) -> Option<Command> {
        self.rx.recv().await
    }

    /// Acknowledge the most recently dequeued command. Called exactly
    /// once per command.
    pub fn mark_done(&self) {
        let previous = self.shared.outstanding.fetch_sub(1, Ordering::AcqRel);
        if previous <= 1 {
            self.shared.drained.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::{Command, CommandQueue};

    const WAIT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn fifo_order_is_preserved() {
        let (queue, mut consumer) = CommandQueue::channel();
        queue.push(Command::new("first"));
        queue.push(Command::new("second"));
        assert_eq!(consumer.next().await.unwrap().text(), "first");
        assert_eq!(consumer.next().await.unwrap().text(), "second");
    }

    #[tokio::test]
    async fn join_waits_for_mark_done() {
        let (queue, mut consumer) = CommandQueue::channel();
        queue.push(Command::new("one"));
        let _dequeued = consumer.next().await.unwrap();
        assert!(timeout(WAIT, queue.join()).await.is_err());
        consumer.mark_done();
        timeout(WAIT, queue.join()).await.unwrap();
    }

    #[tokio::test]
    async fn join_is_immediate_when_empty() {
        let (queue, _consumer) = CommandQueue::channel();
        timeout(WAIT, queue.join()).await.unwrap();
    }

    #[tokio::test]
    async fn next_ends_when_producers_are_gone() {
        let (queue, mut consumer) = CommandQueue::channel();
        queue.push(Command::new("last"));
        drop(queue);
        assert!(consumer.next().await.is_some());
        assert!(consumer.next().await.is_none());
    }

    #[tokio::test]
    async fn push_after_consumer_drop_is_ignored() {
        let (queue, consumer) = CommandQueue::channel();
        drop(consumer);
        queue.push(Command::new("late"));
        timeout(WAIT, queue.join()).await.unwrap();
    }
}
