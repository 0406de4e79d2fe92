use async_trait::async_trait;

mod channel;
mod error;
mod frame;
mod socket;

pub use channel::ChannelBus;
pub use error::BusError;
pub use frame::Frame;
pub use socket::CanBus;

/// One CAN channel, shared by every task that transmits and drained by
/// the notification dispatcher. A `send` is a single transmit request
/// to the transport; ordering between concurrent senders is whatever
/// the transport arbitrates.
#[async_trait]
pub trait Bus: Send + Sync {
    async fn send(&self, frame: Frame) -> Result<(), BusError>;
    async fn recv(&self) -> Result<Frame, BusError>;
}
