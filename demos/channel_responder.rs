use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::channel;
use tokio_util::sync::CancellationToken;

use canmux::{ChannelBus, Frame, Listener, Responder};

/// Runs the responder over an in-memory bus: a feeder task plays the
/// rest of the network, cycling counter frames with the bounce and
/// trigger ids, and everything the responder transmits is printed.
/// Commands written to /tmp/can_commands work as on a real bus.
#[tokio::main]
async fn main() {
    env_logger::init();
    let (tx_sender, mut tx_receiver) = channel(32);
    let (rx_sender, rx_receiver) = channel(32);
    let bus = Arc::new(ChannelBus::new(tx_sender, rx_receiver));

    #[allow(clippy::unwrap_used)]
    let feeder = tokio::spawn(async move {
        let mut count = 0u8;
        loop {
            let frame = match count % 3 {
                0 => Frame::new(0x123, &[count, 0xDE, 0xAD, 0xBE, 0xEF]).unwrap(),
                1 => Frame::new(20, &[count]).unwrap(),
                _ => Frame::new(10, &[]).unwrap(),
            };
            if rx_sender.send(frame).await.is_err() {
                break;
            }
            count = count.wrapping_add(1);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(frame) = tx_receiver.recv().await {
            println!("wire <- {frame}");
        }
    });

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        interrupt.cancel();
    });

    Responder::builder(bus)
        .settle(Duration::from_millis(100))
        .with_listener(Listener::callback(|frame| println!("wire -> {frame}")))
        .build()
        .run(cancel)
        .await;

    feeder.abort();
    let _ = printer.await;
}
