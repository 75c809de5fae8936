//! Compression envelope detection and (de)compression (gzip / zlib / raw).

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::{Compression, GzBuilder};

use crate::error::{Error, ErrorKind, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZLIB_MAGIC_BYTE: u8 = 0x78;

/// Initial capacity reserved for a decompressed buffer before the actual
/// size is known, matching the reference implementation's growth strategy.
const INITIAL_DECOMPRESS_CAPACITY: usize = 64 * 1024;

/// The outer compression envelope of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Gzip,
    Zlib,
    Raw,
}

/// Detects the framing of `data` by inspecting its leading magic bytes.
pub fn detect(data: &[u8]) -> Framing {
    if data.len() >= 2 && data[0] == GZIP_MAGIC[0] && data[1] == GZIP_MAGIC[1] {
        Framing::Gzip
    } else if !data.is_empty() && data[0] == ZLIB_MAGIC_BYTE {
        Framing::Zlib
    } else {
        Framing::Raw
    }
}

/// Inflates `data` using whichever framing its magic bytes indicate. Raw
/// data passes through unchanged.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    match detect(data) {
        Framing::Gzip => inflate(GzDecoder::new(data)),
        Framing::Zlib => inflate(ZlibDecoder::new(data)),
        Framing::Raw => Ok(data.to_vec()),
    }
}

fn inflate<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(INITIAL_DECOMPRESS_CAPACITY);
    reader
        .read_to_end(&mut out)
        .map_err(|e| Error::from_io(ErrorKind::UnzipError, 0, e))?;
    log::trace!("decompressed {} bytes", out.len());
    Ok(out)
}

/// The compression level used by [`compress`] when one isn't specified.
/// Favors best ratio, matching zlib's `Z_BEST_COMPRESSION`.
pub fn default_level() -> Compression {
    Compression::best()
}

/// Deflates `data` into the requested framing at `level`. `Framing::Raw`
/// returns the bytes unchanged.
pub fn compress(data: &[u8], framing: Framing, level: Compression) -> Result<Vec<u8>> {
    match framing {
        Framing::Gzip => {
            let mut buf = Vec::new();
            {
                let mut encoder = GzBuilder::new().write(&mut buf, level);
                encoder
                    .write_all(data)
                    .map_err(|e| Error::from_io(ErrorKind::UnzipError, 0, e))?;
                encoder
                    .finish()
                    .map_err(|e| Error::from_io(ErrorKind::UnzipError, 0, e))?;
            }
            Ok(buf)
        }
        Framing::Zlib => {
            let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), level);
            encoder
                .write_all(data)
                .map_err(|e| Error::from_io(ErrorKind::UnzipError, 0, e))?;
            encoder
                .finish()
                .map_err(|e| Error::from_io(ErrorKind::UnzipError, 0, e))
        }
        Framing::Raw => Ok(data.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gzip_by_magic() {
        assert_eq!(detect(&[0x1f, 0x8b, 0x08]), Framing::Gzip);
    }

    #[test]
    fn detects_zlib_by_magic() {
        assert_eq!(detect(&[0x78, 0x9c]), Framing::Zlib);
    }

    #[test]
    fn falls_back_to_raw() {
        assert_eq!(detect(&[0x0a, 0x00]), Framing::Raw);
        assert_eq!(detect(&[]), Framing::Raw);
    }

    #[test]
    fn single_byte_input_checks_zlib_only() {
        assert_eq!(detect(&[0x78]), Framing::Zlib);
        assert_eq!(detect(&[0x1f]), Framing::Raw);
    }

    #[test]
    fn round_trips_through_every_framing() {
        let data = b"hello nbt world, compressed and not";
        for framing in [Framing::Gzip, Framing::Zlib, Framing::Raw] {
            let compressed = compress(data, framing, default_level()).unwrap();
            let decompressed = decompress(&compressed).unwrap();
            assert_eq!(decompressed, data, "failed round trip for {:?}", framing);
        }
    }
}
