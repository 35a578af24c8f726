//! Minimal PNG encoder for signature rasters.
//!
//! Emits an 8-bit grayscale PNG with stored (uncompressed) deflate blocks.
//! Signature images are small and short-lived inside a document, so
//! simplicity wins over compression ratio.

use crate::raster::RasterImage;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Deflate stored blocks are capped at 65535 bytes of payload.
const MAX_STORED_BLOCK: usize = 65_535;

/// Encode a raster as a grayscale PNG.
pub fn encode_png(image: &RasterImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.pixels.len() + 128);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&image.width.to_be_bytes());
    ihdr.extend_from_slice(&image.height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(0); // color type: grayscale
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut out, b"IHDR", &ihdr);

    write_chunk(&mut out, b"IDAT", &zlib_stored(&filtered_scanlines(image)));
    write_chunk(&mut out, b"IEND", &[]);
    out
}

/// Each scanline is prefixed with filter type 0 (None).
fn filtered_scanlines(image: &RasterImage) -> Vec<u8> {
    let width = image.width as usize;
    let mut raw = Vec::with_capacity(image.pixels.len() + image.height as usize);
    for row in image.pixels.chunks(width.max(1)) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    raw
}

/// Wrap raw bytes in a zlib stream of stored deflate blocks.
fn zlib_stored(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / MAX_STORED_BLOCK * 5 + 16);
    out.push(0x78);
    out.push(0x01);

    let mut blocks = raw.chunks(MAX_STORED_BLOCK).peekable();
    if blocks.peek().is_none() {
        // Zero-byte payload still needs one final stored block.
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
    }
    while let Some(block) = blocks.next() {
        let last = blocks.peek().is_none();
        out.push(if last { 0x01 } else { 0x00 });
        let len = block.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
    }

    out.extend_from_slice(&adler32(raw).to_be_bytes());
    out
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);

    let mut crc_input = Vec::with_capacity(4 + data.len());
    crc_input.extend_from_slice(chunk_type);
    crc_input.extend_from_slice(data);
    out.extend_from_slice(&crc32(&crc_input).to_be_bytes());
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65_521;
    let mut a = 1u32;
    let mut b = 0u32;
    for chunk in data.chunks(4096) {
        for &byte in chunk {
            a += byte as u32;
            b += a;
        }
        a %= MOD;
        b %= MOD;
    }
    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::rasterize;

    #[test]
    fn encoded_png_carries_signature_and_chunks() {
        let image = rasterize(&[], 4, 3);
        let png = encode_png(&image);

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        // IHDR immediately follows the signature.
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &4u32.to_be_bytes());
        assert_eq!(&png[20..24], &3u32.to_be_bytes());
        // Stream ends with IEND.
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn crc32_matches_known_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn adler32_matches_known_vector() {
        // "Wikipedia" per RFC 1950 example.
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn idat_payload_covers_all_scanlines() {
        let image = rasterize(&[], 4, 3);
        let raw = filtered_scanlines(&image);
        // 3 rows × (1 filter byte + 4 pixels)
        assert_eq!(raw.len(), 15);
        assert!(raw.chunks(5).all(|row| row[0] == 0));
    }
}
