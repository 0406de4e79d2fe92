use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{Command, CommandConsumer};
use crate::bus::Bus;

/// Sole consumer of the command queue. Each dequeued command is parsed
/// and executed, then acknowledged before the pacing delay. Malformed
/// commands and transmit failures are logged and drained; only
/// cancellation ends the loop.
pub struct CommandProcessor {
    consumer: CommandConsumer,
    bus: Arc<dyn Bus>,
    pace: Duration,
}

impl CommandProcessor {
    pub fn new(consumer: CommandConsumer, bus: Arc<dyn Bus>, pace: Duration) -> Self {
        Self {
            consumer,
            bus,
            pace,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        log::info!("command processor started");
        loop {
            let command = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                dequeued = self.consumer.next() => match dequeued {
                    Some(command) => command,
                    None => break,
                },
            };
            self.execute(&command).await;
            self.consumer.mark_done();
            // Rate-limits bus writes; not needed for correctness.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.pace) => {}
            }
        }
        log::info!("command processor stopped");
    }

    async fn execute(&self, command: &Command) {
        log::debug!("processing command {:?}", command.text());
        match command.to_frame() {
            Ok(Some(frame)) => match self.bus.send(frame).await {
                Ok(()) => log::info!("sent {frame}"),
                Err(e) => log::error!("send failed for {:?}: {e}", command.text()),
            },
            Ok(None) => log::debug!("not a send command, passing over: {:?}", command.text()),
            Err(e) => log::warn!("discarding command {:?}: {e}", command.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    use super::CommandProcessor;
    use crate::bus::ChannelBus;
    use crate::command::{Command, CommandQueue};

    const WAIT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn executes_send_commands_in_order() {
        let (wire_tx, mut wire_rx) = mpsc::channel(8);
        let (_wire_in, bus_rx) = mpsc::channel(8);
        let bus = Arc::new(ChannelBus::new(wire_tx, bus_rx));
        let (queue, consumer) = CommandQueue::channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            CommandProcessor::new(consumer, bus, Duration::from_millis(1)).run(cancel.clone()),
        );

        queue.push(Command::new("send 0x100 1 2"));
        queue.push(Command::new("send 0x101 3 4"));

        let first = timeout(WAIT, wire_rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.id(), 0x100);
        assert_eq!(first.data(), &[1, 2]);
        let second = timeout(WAIT, wire_rx.recv()).await.unwrap().unwrap();
        assert_eq!(second.id(), 0x101);
        assert_eq!(second.data(), &[3, 4]);

        cancel.cancel();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn malformed_and_inert_commands_still_drain() {
        let (wire_tx, mut wire_rx) = mpsc::channel(8);
        let (_wire_in, bus_rx) = mpsc::channel(8);
        let bus = Arc::new(ChannelBus::new(wire_tx, bus_rx));
        let (queue, consumer) = CommandQueue::channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            CommandProcessor::new(consumer, bus, Duration::from_millis(1)).run(cancel.clone()),
        );

        queue.push(Command::new("send 0x100 7"));
        queue.push(Command::new("hello there"));
        queue.push(Command::new("send 0x100 nope 2"));

        timeout(WAIT, queue.join()).await.unwrap();
        assert!(wire_rx.try_recv().is_err());

        cancel.cancel();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn transmit_failure_does_not_stop_the_loop() {
        let (wire_tx, wire_rx) = mpsc::channel(8);
        drop(wire_rx);
        let (_wire_in, bus_rx) = mpsc::channel(8);
        let bus = Arc::new(ChannelBus::new(wire_tx, bus_rx));
        let (queue, consumer) = CommandQueue::channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            CommandProcessor::new(consumer, bus, Duration::from_millis(1)).run(cancel.clone()),
        );

        queue.push(Command::new("send 0x100 1 2"));
        queue.push(Command::new("send 0x101 3 4"));

        // Both fail to transmit but are still acknowledged.
        timeout(WAIT, queue.join()).await.unwrap();

        cancel.cancel();
        timeout(WAIT, task).await.unwrap().unwrap();
    }
}
