use std::fmt;

use socketcan::{CanDataFrame, CanFrame, EmbeddedFrame, ExtendedId, Frame as _, Id, StandardId};

use super::BusError;

const MAX_DATA_LEN: usize = 8;
const MAX_STANDARD_ID: u32 = 0x7FF;
const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// A classic CAN frame: arbitration id, up to eight payload bytes and
/// the extended-id flag. Frames are plain values; deriving a reply from
/// a received frame goes through [`Frame::with_id`], the original is
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    id: u32,
    data: [u8; MAX_DATA_LEN],
    len: u8,
    extended: bool,
}

impl Frame {
    /// Build a frame. Ids above `0x7FF` use the extended 29-bit format.
    pub fn new(id: u32, data: &[u8]) -> Result<Self, BusError> {
        if data.len() > MAX_DATA_LEN {
            return Err(BusError::InvalidFrame(format!(
                "payload of {} bytes",
                data.len()
            )));
        }
        if id > MAX_EXTENDED_ID {
            return Err(BusError::InvalidFrame(format!(
                "arbitration id {id:#x} out of range"
            )));
        }
        let mut buf = [0u8; MAX_DATA_LEN];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            id,
            data: buf,
            len: data.len() as u8,
            extended: id > MAX_STANDARD_ID,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Copy of this frame carrying a different arbitration id.
    pub fn with_id(&self, id: u32) -> Result<Self, BusError> {
        let mut frame = Self::new(id, self.data())?;
        frame.extended |= self.extended;
        Ok(frame)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "{:08X}", self.id)?;
        } else {
            write!(f, "{:03X}", self.id)?;
        }
        write!(f, " [{}]", self.len)?;
        for byte in self.data() {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}

impl TryFrom<&Frame> for CanFrame {
    type Error = BusError;

    fn try_from(frame: &Frame) -> Result<Self, BusError> {
        let id = if frame.extended {
            ExtendedId::new(frame.id).map(Id::Extended)
        } else {
            u16::try_from(frame.id)
                .ok()
                .and_then(StandardId::new)
                .map(Id::Standard)
        }
        .ok_or_else(|| BusError::InvalidFrame(format!("arbitration id {:#x}", frame.id)))?;
        CanFrame::new(id, frame.data())
            .ok_or_else(|| BusError::InvalidFrame("rejected by socketcan".to_owned()))
    }
}

impl From<&CanDataFrame> for Frame {
    fn from(frame: &CanDataFrame) -> Self {
        let data = frame.data();
        let len = data.len().min(MAX_DATA_LEN);
        let mut buf = [0u8; MAX_DATA_LEN];
        buf[..len].copy_from_slice(&data[..len]);
        Self {
            id: frame.raw_id(),
            data: buf,
            len: len as u8,
            extended: frame.is_extended(),
        }
    }
}
