use std::io;
use thiserror::Error;

/// Errors raised while reading or writing wire frames.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("frame codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("frame of {len} bytes exceeds the {max} byte cap")]
    FrameTooLarge { len: u64, max: u64 },
}

impl WireError {
    /// True when the peer went away rather than sending garbage. A clean
    /// close lands here as `UnexpectedEof` on the length prefix.
    pub fn is_disconnect(&self) -> bool {
        match self {
            WireError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
