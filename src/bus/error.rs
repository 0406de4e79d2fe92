use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("socketcan error: {0}")]
    Can(#[from] socketcan::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("bus closed")]
    Closed,
}
