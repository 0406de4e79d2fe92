use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{
    mpsc::{Receiver, Sender},
    Mutex,
};

use super::{Bus, BusError, Frame};

/// In-memory bus over a pair of tokio channels: transmitted frames go
/// out on `tx`, received frames arrive on `rx`. The tests and the
/// channel demo hold the opposite channel ends and play the wire.
pub struct ChannelBus(Arc<ChannelBusInner>);

struct ChannelBusInner {
    tx: Sender<Frame>,
    rx: Mutex<Receiver<Frame>>,
}

impl ChannelBus {
    pub fn new(tx: Sender<Frame>, rx: Receiver<Frame>) -> Self {
        Self(Arc::new(ChannelBusInner {
            tx,
            rx: Mutex::new(rx),
        }))
    }
}

#[async_trait]
impl Bus for ChannelBus {
    async fn send(&self, frame: Frame) -> Result<(), BusError> {
        self.0.tx.send(frame).await.map_err(|_| BusError::Closed)
    }

    async fn recv(&self) -> Result<Frame, BusError> {
        let mut rx = self.0.rx.lock().await;
        rx.recv().await.ok_or(BusError::Closed)
    }
}
