//! Bounds-checked big-endian cursors over byte windows.
//!
//! Mirrors the reference implementation's `NBT_Buffer`: every read or write
//! is total-or-error, with no partial reads and no panics on short input.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, ErrorKind, Result};

/// A read-only cursor over a borrowed byte slice.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

// Generates `read_u16`/`read_i16`/.../`read_f64` off of `byteorder`'s
// big-endian free functions, the way the teacher's `Parser` generated its
// `parse_*` methods with `paste::item!`.
macro_rules! read_number_types {
    ($($typ:ident),+) => {
        paste::item! {
            $(pub fn [<read_ $typ>](&mut self) -> Result<$typ> {
                let bytes = self.read_bytes(std::mem::size_of::<$typ>())?;
                Ok(BigEndian::[<read_ $typ>](bytes))
            })*
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::new(ErrorKind::EarlyEof, self.pos));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_number_types!(u16, i16, u32, i32, u64, i64, f32, f64);

    /// Reads a u16-length-prefixed byte string, as used for NBT keys and
    /// String payloads. No encoding validation is performed.
    pub fn read_short_string(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u16()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

/// A write sink that a codec writes big-endian values into. Implemented by
/// both a bounded fixed-size window (`SliceWriter`, failing with
/// `BufferOverflow`) and an unbounded growable sink (`VecWriter`).
pub trait WriteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    fn position(&self) -> usize;
}

macro_rules! write_number_types {
    ($($typ:ident),+) => {
        paste::item! {
            $(fn [<write_ $typ>](&mut self, value: $typ) -> Result<()> {
                let mut buf = [0u8; std::mem::size_of::<$typ>()];
                BigEndian::[<write_ $typ>](&mut buf, value);
                self.write_bytes(&buf)
            })*
        }
    };
}

/// Convenience methods shared by every `WriteSink` implementer.
pub trait WriteSinkExt: WriteSink {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    write_number_types!(u16, i16, u32, i32, u64, i64, f32, f64);

    /// Writes a u16-length-prefixed byte string (an NBT key or String payload).
    fn write_short_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_u16(bytes.len() as u16)?;
        self.write_bytes(bytes)
    }
}

impl<T: WriteSink + ?Sized> WriteSinkExt for T {}

/// A bounded write sink over a caller-supplied fixed window. Any write past
/// the end of `buf` fails with `BufferOverflow`, giving callers the
/// non-growable boundary behavior required by `pack_into` and the SNBT
/// printer.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }
}

impl<'a> WriteSink for SliceWriter<'a> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buf.len() - self.pos < bytes.len() {
            return Err(Error::new(ErrorKind::BufferOverflow, self.pos));
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// An unbounded write sink backed by an owned, growable `Vec<u8>`. Used by
/// the convenience `pack`/`to_bytes` entry points, which cannot overflow.
#[derive(Default)]
pub struct VecWriter {
    buf: Vec<u8>,
}

impl VecWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl WriteSink for VecWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_scalars() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 1);
        assert_eq!(cursor.read_u32().unwrap(), 2);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn fails_with_early_eof_on_short_input() {
        let data = [0x00];
        let mut cursor = Cursor::new(&data);
        let err = cursor.read_u16().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EarlyEof);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn short_string_reads_length_prefixed_bytes() {
        let data = [0x00, 0x03, b'c', b'a', b't'];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_short_string().unwrap(), b"cat".to_vec());
    }

    #[test]
    fn slice_writer_overflows_on_final_write() {
        let mut buf = [0u8; 1];
        let mut writer = SliceWriter::new(&mut buf);
        let err = writer.write_u16(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferOverflow);
    }

    #[test]
    fn vec_writer_grows_without_bound() {
        let mut writer = VecWriter::new();
        writer.write_u32(0xdeadbeef).unwrap();
        assert_eq!(writer.into_inner(), vec![0xde, 0xad, 0xbe, 0xef]);
    }
}
