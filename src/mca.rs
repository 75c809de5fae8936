//! MCA ("Anvil") region file container: 1024 independently compressed NBT
//! chunks laid out on a 4 KiB sector grid.

use std::io::{Read, Seek, SeekFrom, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ByteOrder};

use crate::compress::{self, Framing};
use crate::decode;
use crate::encode;
use crate::error::{Error, ErrorKind, Result};
use crate::tag::Node;

pub const CHUNKS_IN_REGION: usize = 1024;
pub const REGION_SIDE: usize = 32;
pub const SECTOR_SIZE: usize = 4096;
const HEADER_SECTORS: usize = 2;
const OFFSET_TABLE_LEN: usize = CHUNKS_IN_REGION * 4;
const HEADER_LEN: usize = OFFSET_TABLE_LEN * 2;

/// The per-chunk compression type byte, distinct from the gzip/zlib/raw
/// magic-byte detection `compress` uses on the inflated NBT itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompressionType {
    Gzip = 1,
    Zlib = 2,
    Raw = 3,
}

impl CompressionType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Gzip),
            2 => Some(Self::Zlib),
            3 => Some(Self::Raw),
            _ => None,
        }
    }

    fn as_u8(self) -> u8 {
        self as u8
    }
}

/// How [`Mca::write_raw`] populates the timestamp table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Stamp every present slot with the current epoch second, matching the
    /// reference writer (and its loss of per-slot history).
    #[default]
    CurrentEpoch,
    /// Write back whatever timestamp each slot already carries.
    Preserve,
}

#[derive(Clone, Default)]
struct Slot {
    payload: Vec<u8>,
    timestamp: u32,
}

/// A parsed or in-progress region file: up to 1024 chunk slots addressed by
/// `x + 32*z`.
pub struct Mca {
    pub has_position: bool,
    pub x: i32,
    pub z: i32,
    slots: Vec<Option<Slot>>,
    parsed: Vec<Option<Node>>,
}

impl Mca {
    pub fn new() -> Self {
        Self {
            has_position: false,
            x: 0,
            z: 0,
            slots: vec![None; CHUNKS_IN_REGION],
            parsed: vec![None; CHUNKS_IN_REGION],
        }
    }

    /// Infers region coordinates from a `r.<x>.<z>.mca` basename. Leaves
    /// `has_position` false (rather than failing) when the name doesn't
    /// match, since the filename is advisory metadata, not wire content.
    pub fn init(filename: &str) -> Self {
        let mut mca = Self::new();
        let basename = filename.rsplit('/').next().unwrap_or(filename);
        let parts: Vec<&str> = basename.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" && parts[3] == "mca" {
            if let (Ok(x), Ok(z)) = (parts[1].parse::<i32>(), parts[2].parse::<i32>()) {
                mca.has_position = true;
                mca.x = x;
                mca.z = z;
            }
        }
        mca
    }

    pub fn chunk_index(x: usize, z: usize) -> Option<usize> {
        if x < REGION_SIDE && z < REGION_SIDE {
            Some(x + REGION_SIDE * z)
        } else {
            None
        }
    }

    fn check_index(index: usize) -> Result<()> {
        if index >= CHUNKS_IN_REGION {
            return Err(Error::new(ErrorKind::InvalidData, index));
        }
        Ok(())
    }

    /// Parses a whole region file already held in memory. `skip_chunk_error`
    /// downgrades a malformed individual slot to "absent" instead of
    /// failing the whole parse.
    pub fn read_raw(data: &[u8], skip_chunk_error: bool) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::new(ErrorKind::InvalidData, data.len()));
        }

        let mut mca = Self::new();
        let mut offsets = [0u32; CHUNKS_IN_REGION];
        for (i, entry) in offsets.iter_mut().enumerate() {
            *entry = BigEndian::read_u32(&data[i * 4..i * 4 + 4]);
        }

        for i in 0..CHUNKS_IN_REGION {
            let ts_pos = OFFSET_TABLE_LEN + i * 4;
            let timestamp = BigEndian::read_u32(&data[ts_pos..ts_pos + 4]);
            mca.slots[i] = Some(Slot { payload: Vec::new(), timestamp });
        }

        for i in 0..CHUNKS_IN_REGION {
            let entry = offsets[i];
            if entry == 0 {
                mca.slots[i] = None;
                continue;
            }
            let sector_offset = (entry >> 8) as usize;
            let sector_count = (entry & 0xff) as usize;
            let byte_offset = sector_offset * SECTOR_SIZE;
            let byte_end = byte_offset.saturating_add(sector_count * SECTOR_SIZE);

            if sector_count == 0 || byte_end > data.len() || byte_offset + 5 > data.len() {
                if skip_chunk_error {
                    log::warn!("mca slot {i} has an out-of-range sector entry, skipping");
                    mca.slots[i] = None;
                    continue;
                }
                return Err(Error::new(ErrorKind::InvalidData, byte_offset));
            }

            let length = BigEndian::read_u32(&data[byte_offset..byte_offset + 4]) as usize;
            let comp_byte = data[byte_offset + 4];
            if CompressionType::from_u8(comp_byte) != Some(CompressionType::Zlib)
                && !skip_chunk_error
            {
                return Err(Error::new(ErrorKind::InvalidData, byte_offset + 4));
            }
            if length == 0 {
                if skip_chunk_error {
                    mca.slots[i] = None;
                    continue;
                }
                return Err(Error::new(ErrorKind::InvalidData, byte_offset));
            }

            let payload_start = byte_offset + 5;
            let payload_len = length - 1;
            let payload_end = payload_start + payload_len;
            if payload_end > data.len() {
                if skip_chunk_error {
                    mca.slots[i] = None;
                    continue;
                }
                return Err(Error::new(ErrorKind::InvalidData, payload_start));
            }

            let timestamp = mca.slots[i].as_ref().map(|s| s.timestamp).unwrap_or(0);
            mca.slots[i] = Some(Slot {
                payload: data[payload_start..payload_end].to_vec(),
                timestamp,
            });
        }

        Ok(mca)
    }

    /// Reads an entire region file from a seekable handle, then delegates to
    /// [`read_raw`](Self::read_raw).
    pub fn read_raw_file<R: Read + Seek>(reader: &mut R, skip_chunk_error: bool) -> Result<Self> {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::from_io(ErrorKind::Internal, 0, e))?;
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::from_io(ErrorKind::Internal, 0, e))?;
        Self::read_raw(&data, skip_chunk_error)
    }

    /// Decodes every present slot's compressed payload into an NBT tree.
    /// Returns the number of slots that failed to decode; failures are
    /// logged and otherwise leave that slot's parsed tree absent.
    pub fn parse_all(&mut self) -> usize {
        let mut failures = 0;
        for i in 0..CHUNKS_IN_REGION {
            self.parsed[i] = None;
            let Some(slot) = self.slots[i].clone() else {
                continue;
            };
            match decode::parse(&slot.payload) {
                Ok((tree, soft_err)) => {
                    if let Some(err) = soft_err {
                        log::warn!("mca slot {i} left {} bytes unconsumed", err.position());
                    }
                    self.parsed[i] = Some(tree);
                }
                Err(err) => {
                    log::warn!("mca slot {i} failed to decode: {err}");
                    failures += 1;
                }
            }
        }
        failures
    }

    pub fn parsed_chunk(&self, index: usize) -> Option<&Node> {
        self.parsed.get(index).and_then(Option::as_ref)
    }

    /// Encodes and zlib-compresses `tree`, storing it as slot `index`'s
    /// payload for a later [`write_raw`](Self::write_raw).
    pub fn set_chunk(&mut self, index: usize, tree: &Node) -> Result<()> {
        Self::check_index(index)?;
        let uncompressed = encode::encode_raw(tree)?;
        let payload = compress::compress(&uncompressed, Framing::Zlib, compress::default_level())?;
        let timestamp = self.slots[index].as_ref().map(|s| s.timestamp).unwrap_or(0);
        self.slots[index] = Some(Slot { payload, timestamp });
        Ok(())
    }

    pub fn chunk_bytes(&self, index: usize) -> Option<&[u8]> {
        self.slots.get(index)?.as_ref().map(|s| s.payload.as_slice())
    }

    pub fn timestamp(&self, index: usize) -> u32 {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .map(|s| s.timestamp)
            .unwrap_or(0)
    }

    /// Packs every present slot into a fresh region-file buffer, allocating
    /// sectors contiguously from sector 2 in slot order.
    pub fn write_raw(&self, timestamp_policy: TimestampPolicy) -> Result<Vec<u8>> {
        let mut offsets = [0u32; CHUNKS_IN_REGION];
        let mut timestamps = [0u32; CHUNKS_IN_REGION];
        let mut body = Vec::new();
        let mut current_sector = HEADER_SECTORS;
        let now = current_epoch_secs();

        for i in 0..CHUNKS_IN_REGION {
            let Some(slot) = &self.slots[i] else {
                continue;
            };

            let length = u32::try_from(slot.payload.len() + 1)
                .map_err(|_| Error::new(ErrorKind::InvalidData, i))?;
            let mut chunk = Vec::with_capacity(5 + slot.payload.len());
            chunk.extend_from_slice(&length.to_be_bytes());
            chunk.push(CompressionType::Zlib.as_u8());
            chunk.extend_from_slice(&slot.payload);

            let sector_count = chunk.len().div_ceil(SECTOR_SIZE).max(1);
            if sector_count > 0xff {
                return Err(Error::new(ErrorKind::InvalidData, i));
            }

            body.extend_from_slice(&chunk);
            body.resize(body.len() + sector_count * SECTOR_SIZE - chunk.len(), 0);

            offsets[i] = ((current_sector as u32) << 8) | sector_count as u32;
            timestamps[i] = match timestamp_policy {
                TimestampPolicy::CurrentEpoch => now,
                TimestampPolicy::Preserve => slot.timestamp,
            };
            current_sector += sector_count;
        }

        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        for offset in offsets {
            out.extend_from_slice(&offset.to_be_bytes());
        }
        for ts in timestamps {
            out.extend_from_slice(&ts.to_be_bytes());
        }
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn write_raw_file<W: Write + Seek>(
        &self,
        writer: &mut W,
        timestamp_policy: TimestampPolicy,
    ) -> Result<()> {
        let bytes = self.write_raw(timestamp_policy)?;
        writer
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::from_io(ErrorKind::Internal, 0, e))?;
        writer
            .write_all(&bytes)
            .map_err(|e| Error::from_io(ErrorKind::Internal, 0, e))
    }
}

impl Default for Mca {
    fn default() -> Self {
        Self::new()
    }
}

fn current_epoch_secs() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Payload;

    #[test]
    fn infers_region_coordinates_from_filename() {
        let mca = Mca::init("world/region/r.3.-2.mca");
        assert!(mca.has_position);
        assert_eq!(mca.x, 3);
        assert_eq!(mca.z, -2);
    }

    #[test]
    fn non_matching_filename_has_no_position() {
        let mca = Mca::init("not-a-region-file.bin");
        assert!(!mca.has_position);
    }

    #[test]
    fn empty_region_parses_with_every_slot_absent() {
        let data = vec![0u8; HEADER_LEN];
        let mut mca = Mca::read_raw(&data, false).unwrap();
        assert_eq!(mca.parse_all(), 0);
        for i in 0..CHUNKS_IN_REGION {
            assert!(mca.chunk_bytes(i).is_none());
            assert!(mca.parsed_chunk(i).is_none());
        }
    }

    #[test]
    fn short_file_is_invalid_data() {
        let data = vec![0u8; HEADER_LEN - 1];
        let err = Mca::read_raw(&data, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn round_trips_a_single_chunk() {
        let mut mca = Mca::new();
        let tree = Node::keyed("", Payload::Compound(vec![Node::keyed("id", Payload::Int(5))]));
        mca.set_chunk(0, &tree).unwrap();

        let bytes = mca.write_raw(TimestampPolicy::CurrentEpoch).unwrap();
        let mut reread = Mca::read_raw(&bytes, false).unwrap();
        assert_eq!(reread.parse_all(), 0);
        assert_eq!(reread.parsed_chunk(0).unwrap(), &tree);
        for i in 1..CHUNKS_IN_REGION {
            assert!(reread.chunk_bytes(i).is_none());
        }
    }

    #[test]
    fn preserve_policy_keeps_stored_timestamp() {
        let mut mca = Mca::new();
        let tree = Node::keyed("", Payload::Compound(vec![]));
        mca.set_chunk(0, &tree).unwrap();
        // simulate a previously-read timestamp by writing then re-reading
        let bytes = mca.write_raw(TimestampPolicy::CurrentEpoch).unwrap();
        let mut reread = Mca::read_raw(&bytes, false).unwrap();
        let original_ts = reread.timestamp(0);

        let rewritten = reread.write_raw(TimestampPolicy::Preserve).unwrap();
        let reread_again = Mca::read_raw(&rewritten, false).unwrap();
        assert_eq!(reread_again.timestamp(0), original_ts);
    }

    #[test]
    fn bad_compression_type_fails_unless_skipped() {
        let mut data = vec![0u8; HEADER_LEN + SECTOR_SIZE];
        BigEndian::write_u32(&mut data[0..4], (2 << 8) | 1);
        BigEndian::write_u32(&mut data[HEADER_LEN..HEADER_LEN + 4], 1);
        data[HEADER_LEN + 4] = 9; // invalid compression type
        let err = Mca::read_raw(&data, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let mca = Mca::read_raw(&data, true).unwrap();
        assert!(mca.chunk_bytes(0).is_none());
    }
}
