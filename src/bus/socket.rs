use async_trait::async_trait;
use futures_util::StreamExt;
use socketcan::{tokio::AsyncCanSocket, CanFrame, CanSocket};
use tokio::sync::Mutex;

use super::{Bus, BusError, Frame};

/// SocketCAN-backed bus. Separate rx and tx sockets, so a pending
/// receive never delays a transmit; the tx lock is held for exactly one
/// write per send, which keeps each transmit atomic when the tasks run
/// on a multi-threaded runtime.
pub struct CanBus {
    rx: Mutex<AsyncCanSocket<CanSocket>>,
    tx: Mutex<AsyncCanSocket<CanSocket>>,
}

impl CanBus {
    pub fn open(interface: &str) -> Result<Self, BusError> {
        let rx = AsyncCanSocket::open(interface)?;
        let tx = AsyncCanSocket::open(interface)?;
        Ok(Self {
            rx: Mutex::new(rx),
            tx: Mutex::new(tx),
        })
    }
}

#[async_trait]
impl Bus for CanBus {
    async fn send(&self, frame: Frame) -> Result<(), BusError> {
        let can_frame = CanFrame::try_from(&frame)?;
        let mut socket = self.tx.lock().await;
        socket.write_frame(can_frame).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, BusError> {
        let mut socket = self.rx.lock().await;
        loop {
            match socket.next().await {
                Some(Ok(CanFrame::Data(data))) => return Ok(Frame::from(&data)),
                Some(Ok(other)) => log::debug!("ignoring non-data frame {other:?}"),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(BusError::Closed),
            }
        }
    }
}
