//! NBT decoding: bytes to tree.

use crate::compress;
use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::kind::Kind;
use crate::tag::{Node, Payload};

/// Recursion depth after which `parse` refuses to descend further, matching
/// no real Minecraft document but guarding against adversarial input driving
/// the recursive decoder into a stack overflow.
pub const DEFAULT_MAX_DEPTH: u32 = 512;

/// Parses a complete NBT document, auto-detecting gzip/zlib/raw framing.
///
/// On success the tree is always returned. If trailing bytes follow the
/// top-level value, `Ok` still carries the tree, paired with a
/// `LeftoverData` error describing the offset where decoding stopped — the
/// same "soft failure" contract as the reference implementation.
pub fn parse(data: &[u8]) -> Result<(Node, Option<Error>)> {
    parse_with_max_depth(data, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_max_depth(data: &[u8], max_depth: u32) -> Result<(Node, Option<Error>)> {
    let inflated = compress::decompress(data)?;
    let mut cursor = Cursor::new(&inflated);
    let root = decode_node(&mut cursor, false, max_depth, 0)?;
    if cursor.remaining() > 0 {
        log::warn!(
            "{} bytes left over after decoding root value",
            cursor.remaining()
        );
        let err = Error::new(ErrorKind::LeftoverData, cursor.position());
        return Ok((root, Some(err)));
    }
    Ok((root, None))
}

/// Decodes one node: a kind byte (unless `skip_kind_byte`, used for List
/// elements whose kind is already known), then a key (always present —
/// List elements set it to `None` at the call site since the wire format
/// has no key for them), then the payload for that kind.
fn decode_node(
    cursor: &mut Cursor,
    skip_key: bool,
    max_depth: u32,
    depth: u32,
) -> Result<Node> {
    let kind_byte = cursor.read_u8()?;
    let kind = Kind::from_u8(kind_byte)
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, cursor.position() - 1))?;
    decode_node_of_kind(cursor, kind, skip_key, max_depth, depth)
}

fn decode_node_of_kind(
    cursor: &mut Cursor,
    kind: Kind,
    skip_key: bool,
    max_depth: u32,
    depth: u32,
) -> Result<Node> {
    let key = if skip_key {
        None
    } else {
        Some(cursor.read_short_string()?)
    };
    let payload = decode_payload(cursor, kind, max_depth, depth)?;
    Ok(Node::new(key, payload))
}

fn decode_payload(
    cursor: &mut Cursor,
    kind: Kind,
    max_depth: u32,
    depth: u32,
) -> Result<Payload> {
    Ok(match kind {
        Kind::End => {
            return Err(Error::new(ErrorKind::InvalidData, cursor.position()));
        }
        Kind::Byte => Payload::Byte(cursor.read_i8()?),
        Kind::Short => Payload::Short(cursor.read_i16()?),
        Kind::Int => Payload::Int(cursor.read_i32()?),
        Kind::Long => Payload::Long(cursor.read_i64()?),
        Kind::Float => Payload::Float(cursor.read_f32()?),
        Kind::Double => Payload::Double(cursor.read_f64()?),
        Kind::ByteArray => {
            let len = read_array_len(cursor)?;
            let mut items = Vec::with_capacity(len.min(1 << 20));
            for _ in 0..len {
                items.push(cursor.read_i8()?);
            }
            Payload::ByteArray(items)
        }
        Kind::String => Payload::String(cursor.read_short_string()?),
        Kind::List => decode_list(cursor, max_depth, depth)?,
        Kind::Compound => decode_compound(cursor, max_depth, depth)?,
        Kind::IntArray => {
            let len = read_array_len(cursor)?;
            let mut items = Vec::with_capacity(len.min(1 << 20));
            for _ in 0..len {
                items.push(cursor.read_i32()?);
            }
            Payload::IntArray(items)
        }
        Kind::LongArray => {
            let len = read_array_len(cursor)?;
            let mut items = Vec::with_capacity(len.min(1 << 20));
            for _ in 0..len {
                items.push(cursor.read_i64()?);
            }
            Payload::LongArray(items)
        }
    })
}

fn read_array_len(cursor: &mut Cursor) -> Result<usize> {
    let len = cursor.read_i32()?;
    if len < 0 {
        return Err(Error::new(ErrorKind::InvalidData, cursor.position() - 4));
    }
    Ok(len as usize)
}

fn enter_container(cursor: &Cursor, max_depth: u32, depth: u32) -> Result<u32> {
    if depth >= max_depth {
        return Err(Error::new(ErrorKind::InvalidData, cursor.position()));
    }
    Ok(depth + 1)
}

fn decode_list(cursor: &mut Cursor, max_depth: u32, depth: u32) -> Result<Payload> {
    let next_depth = enter_container(cursor, max_depth, depth)?;
    let element_kind_byte = cursor.read_u8()?;
    let element_kind = Kind::from_u8(element_kind_byte)
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, cursor.position() - 1))?;
    let len = read_array_len(cursor)?;
    if element_kind == Kind::End && len != 0 {
        return Err(Error::new(ErrorKind::InvalidData, cursor.position()));
    }
    let mut items = Vec::with_capacity(len.min(1 << 16));
    for _ in 0..len {
        items.push(decode_node_of_kind(
            cursor,
            element_kind,
            true,
            max_depth,
            next_depth,
        )?);
    }
    Ok(Payload::List { element_kind, items })
}

fn decode_compound(cursor: &mut Cursor, max_depth: u32, depth: u32) -> Result<Payload> {
    let next_depth = enter_container(cursor, max_depth, depth)?;
    let mut children = Vec::new();
    loop {
        let kind_byte = cursor.read_u8()?;
        let kind = Kind::from_u8(kind_byte)
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, cursor.position() - 1))?;
        if kind == Kind::End {
            break;
        }
        children.push(decode_node_of_kind(cursor, kind, false, max_depth, next_depth)?);
    }
    Ok(Payload::Compound(children))
}
