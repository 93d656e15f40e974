//! Chunked binary image helpers.
//!
//! Layout of an image:
//! - magic: `[u8; 8]`
//! - version: `u32`
//! - chunks until EOF, each:
//!   - tag: `[u8; 4]`
//!   - len: `u32` (bytes following, including the 4-byte uncompressed length)
//!   - uncompressed_len: `u32`
//!   - LZ4 block payload
//!
//! All integers are little-endian.

use std::io::{self, Read, Write};

pub const MAGIC: &[u8; 8] = b"SPKNET01";
pub const VERSION_V1: u32 = 1;
pub const VERSION_CURRENT: u32 = VERSION_V1;

pub fn compress_lz4(input: &[u8]) -> Vec<u8> {
    lz4_flex::compress(input)
}

pub fn decompress_lz4(input: &[u8], expected_size: usize) -> io::Result<Vec<u8>> {
    lz4_flex::decompress(input, expected_size)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "lz4 decompression failed"))
}

pub fn write_u32_le<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u64_le<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_f32_le<W: Write>(w: &mut W, v: f32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Length-prefixed `f32` array.
pub fn write_f32_slice<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    let n = u32::try_from(values.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "array too large"))?;
    write_u32_le(w, n)?;
    for &v in values {
        write_f32_le(w, v)?;
    }
    Ok(())
}

pub fn read_exact<const N: usize, R: Read>(r: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u32_le<R: Read>(r: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_exact::<4, _>(r)?))
}

pub fn read_u64_le<R: Read>(r: &mut R) -> io::Result<u64> {
    Ok(u64::from_le_bytes(read_exact::<8, _>(r)?))
}

pub fn read_f32_le<R: Read>(r: &mut R) -> io::Result<f32> {
    Ok(f32::from_le_bytes(read_exact::<4, _>(r)?))
}

pub fn read_f32_vec<R: Read>(r: &mut R) -> io::Result<Vec<f32>> {
    let n = read_u32_le(r)? as usize;
    let mut out = Vec::with_capacity(n.min(1 << 20));
    for _ in 0..n {
        out.push(read_f32_le(r)?);
    }
    Ok(out)
}

pub fn write_header<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(MAGIC)?;
    write_u32_le(w, VERSION_CURRENT)
}

pub fn read_header<R: Read>(r: &mut R) -> io::Result<()> {
    let magic = read_exact::<8, _>(r)?;
    if &magic != MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "bad network image magic",
        ));
    }
    let version = read_u32_le(r)?;
    if version != VERSION_CURRENT {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "unsupported network image version",
        ));
    }
    Ok(())
}

/// Write one LZ4-compressed chunk.
pub fn write_chunk_lz4<W: Write>(w: &mut W, tag: [u8; 4], payload: &[u8]) -> io::Result<()> {
    let compressed = compress_lz4(payload);
    let uncompressed_len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "chunk too large"))?;
    let total_len = 4u32.saturating_add(
        u32::try_from(compressed.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "chunk too large"))?,
    );

    w.write_all(&tag)?;
    write_u32_le(w, total_len)?;
    write_u32_le(w, uncompressed_len)?;
    w.write_all(&compressed)
}

/// Read the next chunk, returning its tag and decompressed payload.
///
/// Returns `Ok(None)` at a clean end of stream.
pub fn read_chunk_lz4<R: Read>(r: &mut R) -> io::Result<Option<([u8; 4], Vec<u8>)>> {
    let tag = match read_exact::<4, _>(r) {
        Ok(tag) => tag,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };
    let len = read_u32_le(r)?;

    let mut take = r.take(u64::from(len));
    let uncompressed_len = read_u32_le(&mut take)? as usize;
    let mut compressed = Vec::with_capacity((len as usize).saturating_sub(4));
    take.read_to_end(&mut compressed)?;
    if compressed.len() + 4 != len as usize {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated chunk",
        ));
    }
    let payload = decompress_lz4(&compressed, uncompressed_len)?;
    Ok(Some((tag, payload)))
}
