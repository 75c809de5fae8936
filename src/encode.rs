//! NBT encoding: tree to bytes.

use crate::compress::{self, Framing};
use crate::cursor::{SliceWriter, VecWriter, WriteSink, WriteSinkExt};
use crate::error::{Error, ErrorKind, Result};
use crate::kind::Kind;
use crate::tag::{Node, Payload};

/// Packs `root` into a freshly allocated, `framing`-wrapped buffer. Never
/// fails with `BufferOverflow` since the sink grows without bound.
pub fn pack(root: &Node, framing: Framing) -> Result<Vec<u8>> {
    let uncompressed = encode_raw(root)?;
    compress::compress(&uncompressed, framing, compress::default_level())
}

/// Packs `root` into the caller-supplied `buf`, failing with
/// `BufferOverflow` rather than growing past its end. Returns the number of
/// bytes written.
pub fn pack_into(root: &Node, framing: Framing, buf: &mut [u8]) -> Result<usize> {
    let bytes = pack(root, framing)?;
    if bytes.len() > buf.len() {
        return Err(Error::new(ErrorKind::BufferOverflow, buf.len()));
    }
    buf[..bytes.len()].copy_from_slice(&bytes);
    Ok(bytes.len())
}

/// Encodes `root` to its uncompressed wire bytes, with no outer framing
/// applied. Used by [`pack`]/[`pack_into`] and by the MCA chunk writer,
/// which applies its own zlib framing per slot and must not compress twice.
pub(crate) fn encode_raw(root: &Node) -> Result<Vec<u8>> {
    let mut sink = VecWriter::new();
    write_node(&mut sink, root, false)?;
    Ok(sink.into_inner())
}

fn write_node<W: WriteSink>(sink: &mut W, node: &Node, skip_key: bool) -> Result<()> {
    sink.write_u8(node.kind().as_u8())?;
    if !skip_key {
        let key = node.key().unwrap_or(&[]);
        sink.write_short_string(key)?;
    }
    write_payload(sink, &node.payload)
}

fn write_payload<W: WriteSink>(sink: &mut W, payload: &Payload) -> Result<()> {
    match payload {
        Payload::Byte(v) => sink.write_i8(*v),
        Payload::Short(v) => sink.write_i16(*v),
        Payload::Int(v) => sink.write_i32(*v),
        Payload::Long(v) => sink.write_i64(*v),
        Payload::Float(v) => sink.write_f32(*v),
        Payload::Double(v) => sink.write_f64(*v),
        Payload::ByteArray(items) => {
            sink.write_i32(checked_len(items.len())?)?;
            for v in items {
                sink.write_i8(*v)?;
            }
            Ok(())
        }
        Payload::String(bytes) => sink.write_short_string(bytes),
        Payload::List { element_kind, items } => write_list(sink, *element_kind, items),
        Payload::Compound(children) => write_compound(sink, children),
        Payload::IntArray(items) => {
            sink.write_i32(checked_len(items.len())?)?;
            for v in items {
                sink.write_i32(*v)?;
            }
            Ok(())
        }
        Payload::LongArray(items) => {
            sink.write_i32(checked_len(items.len())?)?;
            for v in items {
                sink.write_i64(*v)?;
            }
            Ok(())
        }
    }
}

fn write_list<W: WriteSink>(sink: &mut W, element_kind: Kind, items: &[Node]) -> Result<()> {
    // An empty list's element kind is whatever the tree records (End by
    // convention when built fresh), matching the encoder's own reference
    // behavior of writing the first child's kind or 0 when there is none.
    let effective_kind = if items.is_empty() {
        Kind::End
    } else {
        element_kind
    };
    sink.write_u8(effective_kind.as_u8())?;
    sink.write_i32(checked_len(items.len())?)?;
    for item in items {
        write_payload(sink, &item.payload)?;
    }
    Ok(())
}

fn write_compound<W: WriteSink>(sink: &mut W, children: &[Node]) -> Result<()> {
    for child in children {
        write_node(sink, child, false)?;
    }
    sink.write_u8(Kind::End.as_u8())
}

fn checked_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::new(ErrorKind::InvalidData, 0))
}
