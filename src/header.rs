// SWF file header parsing and rewriting.
//
// An SWF container starts with a fixed 8-byte header: a 3-byte ASCII
// signature, a 1-byte Flash version, and a 4-byte little-endian declared
// file length. Only the signature distinguishes a compressed container
// from an uncompressed one; the version byte and length field are carried
// through a transcode unchanged.

use std::io::{self, Read};

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Signature of an uncompressed SWF container.
pub const FWS_SIGNATURE: [u8; 3] = *b"FWS";

/// Signature of a zlib-compressed SWF container.
pub const CWS_SIGNATURE: [u8; 3] = *b"CWS";

/// Total size of the fixed SWF file header.
pub const HEADER_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Header error
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum HeaderError {
    /// The source ended before 8 header bytes could be read.
    Truncated,
    /// The source failed before 8 header bytes could be read.
    Io(io::Error),
    /// The signature is `FWS`: there is no work to do.
    AlreadyUncompressed,
    /// The signature is neither `FWS` nor `CWS`.
    UnrecognizedSignature([u8; 3]),
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated => write!(f, "truncated SWF header: fewer than {HEADER_LEN} bytes"),
            Self::Io(e) => write!(f, "I/O error reading SWF header: {e}"),
            Self::AlreadyUncompressed => write!(f, "file is already uncompressed"),
            Self::UnrecognizedSignature(sig) => write!(
                f,
                "not an SWF file: signature {:02X} {:02X} {:02X}",
                sig[0], sig[1], sig[2]
            ),
        }
    }
}

impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed header of a compressed SWF container.
///
/// Produced once by [`SwfHeader::read`]; the raw 8-byte buffer is never
/// re-sliced after parsing. `declared_length` is the value stored in the
/// input file, not a recomputed size (see [`SwfHeader::uncompressed_bytes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwfHeader {
    /// Flash version byte.
    pub version: u8,
    /// Declared total file length, little-endian in the container.
    pub declared_length: u32,
}

impl SwfHeader {
    /// Read and validate the fixed 8-byte header of a compressed SWF.
    ///
    /// Consumes exactly [`HEADER_LEN`] bytes on success. Only the `CWS`
    /// signature parses; `FWS` and unknown signatures are terminal
    /// conditions reported as distinct [`HeaderError`] variants.
    pub fn read<R: Read>(r: &mut R) -> Result<Self, HeaderError> {
        let mut raw = [0u8; HEADER_LEN];
        r.read_exact(&mut raw).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HeaderError::Truncated,
            _ => HeaderError::Io(e),
        })?;

        let signature = [raw[0], raw[1], raw[2]];
        if signature == FWS_SIGNATURE {
            return Err(HeaderError::AlreadyUncompressed);
        }
        if signature != CWS_SIGNATURE {
            return Err(HeaderError::UnrecognizedSignature(signature));
        }

        Ok(Self {
            version: raw[3],
            declared_length: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })
    }

    /// The rewritten 8-byte header of the uncompressed output.
    ///
    /// Literal `FWS`, then the version byte and the length field exactly as
    /// they appeared in the input. The length field is not recomputed even
    /// though decompression changes the file's actual size.
    pub fn uncompressed_bytes(&self) -> [u8; HEADER_LEN] {
        let len = self.declared_length.to_le_bytes();
        [
            FWS_SIGNATURE[0],
            FWS_SIGNATURE[1],
            FWS_SIGNATURE[2],
            self.version,
            len[0],
            len[1],
            len[2],
            len[3],
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cws_header_fields() {
        let mut input: &[u8] = &[b'C', b'W', b'S', 6, 0x00, 0x10, 0x00, 0x00];
        let hdr = SwfHeader::read(&mut input).unwrap();
        assert_eq!(hdr.version, 6);
        assert_eq!(hdr.declared_length, 0x1000);
        assert!(input.is_empty(), "exactly 8 bytes consumed");
    }

    #[test]
    fn rewritten_header_preserves_tail() {
        let mut input: &[u8] = &[b'C', b'W', b'S', 10, 0xDE, 0xAD, 0xBE, 0xEF];
        let hdr = SwfHeader::read(&mut input).unwrap();
        assert_eq!(
            hdr.uncompressed_bytes(),
            [b'F', b'W', b'S', 10, 0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn fws_signature_is_already_uncompressed() {
        let mut input: &[u8] = &[b'F', b'W', b'S', 6, 0, 0, 0, 0];
        assert!(matches!(
            SwfHeader::read(&mut input),
            Err(HeaderError::AlreadyUncompressed)
        ));
    }

    #[test]
    fn unknown_signature_is_rejected() {
        let mut input: &[u8] = &[b'Z', b'Z', b'Z', 6, 0, 0, 0, 0];
        assert!(matches!(
            SwfHeader::read(&mut input),
            Err(HeaderError::UnrecognizedSignature([b'Z', b'Z', b'Z']))
        ));
    }

    #[test]
    fn short_input_is_truncated() {
        for len in 0..HEADER_LEN {
            let bytes = vec![b'C'; len];
            let mut input: &[u8] = &bytes;
            assert!(
                matches!(SwfHeader::read(&mut input), Err(HeaderError::Truncated)),
                "length {len}"
            );
        }
    }
}
