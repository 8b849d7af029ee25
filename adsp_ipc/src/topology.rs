//! Topology binary format (§6.2): a sequence of block headers, each
//! `{block_type, block_size, vendor_id, sub_id}` followed by a token/value
//! array bounded by that block's declared size.

use crate::error::{IpcError, Result};
use crate::tlv::TlvCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Comp,
    Pipeline,
    Buffer,
    DapmGraph,
    Kcontrol,
}

impl BlockType {
    fn from_u32(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(BlockType::Comp),
            1 => Ok(BlockType::Pipeline),
            2 => Ok(BlockType::Buffer),
            3 => Ok(BlockType::DapmGraph),
            4 => Ok(BlockType::Kcontrol),
            _ => Err(IpcError::BadParam),
        }
    }
}

/// Known vendor tokens (§6.2 examples). Unrecognized tokens are skipped,
/// not rejected, so this list need not be exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BufSize,
    BufCaps,
    SchedPeriod,
    VolumeRampStepType,
    Unknown(u32),
}

impl Token {
    fn from_u32(raw: u32) -> Self {
        match raw {
            100 => Token::BufSize,
            101 => Token::BufCaps,
            102 => Token::SchedPeriod,
            103 => Token::VolumeRampStepType,
            other => Token::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenValue {
    pub token: Token,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_type: BlockType,
    pub vendor_id: u32,
    pub sub_id: u32,
    pub tokens: Vec<TokenValue>,
}

fn read_u32(buf: &[u8], pos: usize) -> Result<u32> {
    let end = pos.checked_add(4).ok_or(IpcError::BadParam)?;
    let bytes = buf.get(pos..end).ok_or(IpcError::BadParam)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

/// Parse every block in `buf`. Each block's token array is read through a
/// [`TlvCursor`] (tag = token id, value = 4 little-endian bytes), bounds
/// checked against that block's own `block_size`, not the whole buffer —
/// an oversized token array is a parse error even if the outer buffer has
/// more bytes after it (§6.2: "a token array exceeding its enclosing
/// block's size is a parse error").
pub fn parse_blocks(buf: &[u8]) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        if buf.len() - pos < 16 {
            return Err(IpcError::BadParam);
        }
        let block_type = BlockType::from_u32(read_u32(buf, pos)?)?;
        let block_size = read_u32(buf, pos + 4)? as usize;
        let vendor_id = read_u32(buf, pos + 8)?;
        let sub_id = read_u32(buf, pos + 12)?;

        let body_start = pos + 16;
        let body_end = body_start.checked_add(block_size).ok_or(IpcError::BadParam)?;
        let body = buf.get(body_start..body_end).ok_or(IpcError::BadParam)?;

        let mut tokens = Vec::new();
        let mut cursor = TlvCursor::new(body);
        while let Some(entry) = cursor.next()? {
            if entry.value.len() != 4 {
                return Err(IpcError::BadParam);
            }
            let value = u32::from_le_bytes(entry.value.try_into().unwrap());
            tokens.push(TokenValue { token: Token::from_u32(entry.tag), value });
        }

        blocks.push(Block { block_type, vendor_id, sub_id, tokens });
        pos = body_end;
    }
    Ok(blocks)
}
