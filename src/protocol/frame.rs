use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::errors::WireError;

/// Upper bound on a single frame payload. A length prefix above this is
/// treated as a corrupt stream, not an allocation request.
pub const MAX_FRAME_SIZE: u64 = 16 * 1024 * 1024;

/// Wire format: u32 big-endian payload length, then the bincode payload.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serialize(msg)?;
    if payload.len() as u64 > MAX_FRAME_SIZE {
        return Err(WireError::FrameTooLarge {
            len: payload.len() as u64,
            max: MAX_FRAME_SIZE,
        });
    }

    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, WireError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let len = reader.read_u32().await?;
    if len as u64 > MAX_FRAME_SIZE {
        return Err(WireError::FrameTooLarge {
            len: len as u64,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(bincode::deserialize(&payload)?)
}
