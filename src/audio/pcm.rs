//! # PCM Sample Decoding
//!
//! Converts raw binary frames into the 16-bit sample slices the recognition
//! engine consumes. Frames are little-endian signed 16-bit mono PCM with no
//! header and no in-band format negotiation.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Decode one binary frame into little-endian 16-bit samples.
///
/// ## Validation:
/// The frame must contain a whole number of samples. An odd byte count means
/// the client split a sample across frames (or is not sending 16-bit PCM at
/// all) and is rejected so the session can report it as a protocol violation.
///
/// An empty frame decodes to an empty sample slice; the engine accepts it.
pub fn decode_chunk(data: &[u8]) -> Result<Vec<i16>, String> {
    if data.len() % 2 != 0 {
        return Err(format!(
            "audio frame of {} bytes is not a whole number of 16-bit samples",
            data.len()
        ));
    }

    let mut cursor = Cursor::new(data);
    let mut samples = Vec::with_capacity(data.len() / 2);
    while let Ok(sample) = cursor.read_i16::<LittleEndian>() {
        samples.push(sample);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_little_endian_samples() {
        // 0x0102 and -2 (0xFFFE) in little-endian byte order
        let data = [0x02, 0x01, 0xFE, 0xFF];
        let samples = decode_chunk(&data).unwrap();
        assert_eq!(samples, vec![0x0102, -2]);
    }

    #[test]
    fn test_decode_empty_frame() {
        assert_eq!(decode_chunk(&[]).unwrap(), Vec::<i16>::new());
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        let err = decode_chunk(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(err.contains("3 bytes"));
    }

    #[test]
    fn test_decode_zero_chunk() {
        // A tenth of a second of digital silence at 16 kHz / 16-bit
        let samples = decode_chunk(&[0u8; 3200]).unwrap();
        assert_eq!(samples.len(), 1600);
        assert!(samples.iter().all(|&s| s == 0));
    }
}
