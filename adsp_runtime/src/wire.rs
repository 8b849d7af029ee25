//! Explicit little-endian field extraction for command payloads, the same
//! bounds-checked-against-remaining-bytes style `adsp_ipc` uses for the
//! primary header and its TLV cursor.

use adsp_ipc::{IpcError, Result};

pub fn u8_at(buf: &[u8], pos: usize) -> Result<u8> {
    buf.get(pos).copied().ok_or(IpcError::BadParam)
}

pub fn u16_at(buf: &[u8], pos: usize) -> Result<u16> {
    let bytes = buf.get(pos..pos + 2).ok_or(IpcError::BadParam)?;
    Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn u32_at(buf: &[u8], pos: usize) -> Result<u32> {
    let bytes = buf.get(pos..pos + 4).ok_or(IpcError::BadParam)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn u64_at(buf: &[u8], pos: usize) -> Result<u64> {
    let bytes = buf.get(pos..pos + 8).ok_or(IpcError::BadParam)?;
    Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn i32_at(buf: &[u8], pos: usize) -> Result<i32> {
    Ok(u32_at(buf, pos)? as i32)
}
