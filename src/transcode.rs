// Streaming CWS-to-FWS transcode.
//
// Reads the 8-byte SWF header, validates the zlib stream header that
// follows it (RFC 1950), then writes the rewritten uncompressed header
// and streams the decompressed body to the destination. The rewritten
// header always reaches the destination in full before any body byte.

use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use log::{debug, warn};

use crate::header::{HEADER_LEN, HeaderError, SwfHeader};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by [`transcode`].
#[derive(Debug, Clone)]
pub struct TranscodeStats {
    /// Flash version byte, carried through unchanged.
    pub version: u8,
    /// Length field from the input header, carried through unchanged.
    pub declared_length: u32,
    /// Compressed input bytes consumed (header + zlib stream).
    pub compressed_size: u64,
    /// Uncompressed output bytes written (header + body).
    pub output_size: u64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for the streaming transcode.
#[derive(Debug)]
pub enum TranscodeError {
    /// The 8-byte SWF header could not be parsed.
    Header(HeaderError),
    /// The body does not begin with a valid zlib stream header.
    DecompressionInit(String),
    /// The zlib stream is corrupt past its header: a truncated deflate
    /// block or an Adler-32 trailer mismatch.
    DecompressionStream(io::Error),
    /// The source failed mid-body for a non-corruption reason.
    Read(io::Error),
    /// The destination could not accept bytes.
    Write(io::Error),
}

impl std::fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header(e) => write!(f, "{e}"),
            Self::DecompressionInit(msg) => write!(f, "invalid zlib stream header: {msg}"),
            Self::DecompressionStream(e) => write!(f, "corrupt zlib stream: {e}"),
            Self::Read(e) => write!(f, "read error: {e}"),
            Self::Write(e) => write!(f, "write error: {e}"),
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(e) => Some(e),
            Self::DecompressionInit(_) => None,
            Self::DecompressionStream(e) | Self::Read(e) | Self::Write(e) => Some(e),
        }
    }
}

impl From<HeaderError> for TranscodeError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

// ---------------------------------------------------------------------------
// Zlib stream header validation (RFC 1950)
// ---------------------------------------------------------------------------

/// Read and validate the 2-byte CMF/FLG pair at the start of the body.
///
/// The bytes are returned so they can be replayed into the decompressor.
fn read_zlib_header<R: Read>(r: &mut R) -> Result<[u8; 2], TranscodeError> {
    let mut hdr = [0u8; 2];
    r.read_exact(&mut hdr).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            TranscodeError::DecompressionInit("body shorter than a zlib stream header".into())
        }
        _ => TranscodeError::Read(e),
    })?;

    let cmf = hdr[0];
    let flg = hdr[1];
    if cmf & 0x0F != 8 {
        return Err(TranscodeError::DecompressionInit(format!(
            "compression method {} is not deflate",
            cmf & 0x0F
        )));
    }
    if cmf >> 4 > 7 {
        return Err(TranscodeError::DecompressionInit(format!(
            "window size bits {} exceed the deflate maximum",
            cmf >> 4
        )));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(TranscodeError::DecompressionInit(
            "header check bits do not validate".into(),
        ));
    }

    Ok(hdr)
}

/// Error kinds flate2 reports for a damaged stream rather than a failed
/// underlying read.
fn is_corruption(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    )
}

// ---------------------------------------------------------------------------
// transcode
// ---------------------------------------------------------------------------

/// Transcode a compressed SWF stream into its uncompressed form.
///
/// `src` must be positioned at offset 0 of the container. Nothing is
/// written to `dst` until both the SWF header and the zlib stream header
/// have validated, so terminal no-work conditions (`FWS` input,
/// unrecognized signature) never touch the destination.
pub fn transcode<R: Read, W: Write>(
    mut src: R,
    dst: W,
) -> Result<TranscodeStats, TranscodeError> {
    let header = SwfHeader::read(&mut src)?;
    transcode_body(src, dst, &header)
}

/// Transcode the body of a container whose header has already been parsed.
///
/// `src` must be positioned immediately after the 8-byte header. The
/// rewritten header is written before any body byte, then the body streams
/// through a zlib decompressor in `BUF_SIZE` chunks until the zlib stream
/// terminates. Bytes past the zlib stream's own end are ignored.
pub fn transcode_body<R: Read, W: Write>(
    mut src: R,
    mut dst: W,
    header: &SwfHeader,
) -> Result<TranscodeStats, TranscodeError> {
    let zlib_hdr = read_zlib_header(&mut src)?;

    debug!(
        "transcoding CWS container: version {}, declared length {}",
        header.version, header.declared_length
    );

    dst.write_all(&header.uncompressed_bytes())
        .map_err(TranscodeError::Write)?;

    // Replay the validated CMF/FLG pair ahead of the rest of the body.
    let mut decoder = ZlibDecoder::new(io::Cursor::new(zlib_hdr).chain(src));
    let mut buf = vec![0u8; BUF_SIZE];
    let mut body_size = 0u64;

    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if is_corruption(e.kind()) => {
                return Err(TranscodeError::DecompressionStream(e));
            }
            Err(e) => return Err(TranscodeError::Read(e)),
        };
        dst.write_all(&buf[..n]).map_err(TranscodeError::Write)?;
        body_size += n as u64;
    }

    let output_size = HEADER_LEN as u64 + body_size;
    if u64::from(header.declared_length) != output_size {
        // The length field is carried through as-is, never recomputed.
        warn!(
            "declared length {} differs from actual output size {}",
            header.declared_length, output_size
        );
    }

    Ok(TranscodeStats {
        version: header.version,
        declared_length: header.declared_length,
        compressed_size: HEADER_LEN as u64 + decoder.total_in(),
        output_size,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    fn cws_fixture(version: u8, declared_length: u32, body: &[u8]) -> Vec<u8> {
        let mut file = Vec::new();
        file.extend_from_slice(b"CWS");
        file.push(version);
        file.extend_from_slice(&declared_length.to_le_bytes());
        let mut encoder = ZlibEncoder::new(&mut file, Compression::default());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap();
        file
    }

    #[test]
    fn known_input_produces_exact_output() {
        let body: Vec<u8> = (1..=10).collect();
        let input = cws_fixture(6, 0x1000, &body);

        let mut output = Vec::new();
        let stats = transcode(&input[..], &mut output).unwrap();

        let mut expected = vec![b'F', b'W', b'S', 6, 0x00, 0x10, 0x00, 0x00];
        expected.extend_from_slice(&body);
        assert_eq!(output, expected);
        assert_eq!(output.len(), 20);
        assert_eq!(stats.version, 6);
        assert_eq!(stats.declared_length, 0x1000);
        assert_eq!(stats.output_size, 20);
        assert_eq!(stats.compressed_size, input.len() as u64);
    }

    #[test]
    fn already_uncompressed_input_is_refused() {
        let input = [b'F', b'W', b'S', 6, 20, 0, 0, 0];
        let mut output = Vec::new();
        let err = transcode(&input[..], &mut output).unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::Header(HeaderError::AlreadyUncompressed)
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn empty_body_fails_init() {
        let input = [b'C', b'W', b'S', 6, 8, 0, 0, 0];
        let mut output = Vec::new();
        let err = transcode(&input[..], &mut output).unwrap_err();
        assert!(matches!(err, TranscodeError::DecompressionInit(_)));
        assert!(output.is_empty());
    }

    #[test]
    fn garbage_body_fails_init() {
        let mut input = vec![b'C', b'W', b'S', 6, 8, 0, 0, 0];
        input.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00]);
        let mut output = Vec::new();
        let err = transcode(&input[..], &mut output).unwrap_err();
        assert!(matches!(err, TranscodeError::DecompressionInit(_)));
        assert!(output.is_empty(), "nothing written before init validates");
    }

    #[test]
    fn truncated_stream_fails_mid_copy() {
        let body: Vec<u8> = (0..4096u32).flat_map(|i| i.to_le_bytes()).collect();
        let mut input = cws_fixture(6, 0, &body);
        input.truncate(input.len() / 2);

        let mut output = Vec::new();
        let err = transcode(&input[..], &mut output).unwrap_err();
        assert!(matches!(err, TranscodeError::DecompressionStream(_)));
    }

    #[test]
    fn corrupt_trailer_fails_mid_copy() {
        let body = b"adler32 trailer coverage".repeat(8);
        let mut input = cws_fixture(6, 0, &body);
        let last = input.len() - 1;
        input[last] ^= 0xFF;

        let mut output = Vec::new();
        let err = transcode(&input[..], &mut output).unwrap_err();
        assert!(matches!(err, TranscodeError::DecompressionStream(_)));
    }

    #[test]
    fn trailing_bytes_after_stream_are_ignored() {
        let body = b"tail bytes beyond the zlib stream";
        let mut input = cws_fixture(7, 41, body);
        input.extend_from_slice(b"JUNK");

        let mut output = Vec::new();
        let stats = transcode(&input[..], &mut output).unwrap();
        assert_eq!(&output[8..], body);
        assert_eq!(stats.compressed_size, (input.len() - 4) as u64);
    }

    // Sink that accepts a fixed number of bytes and then fails, standing in
    // for a full disk.
    struct BoundedSink {
        written: Vec<u8>,
        remaining: usize,
    }

    impl Write for BoundedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "sink full"));
            }
            let n = buf.len().min(self.remaining);
            self.written.extend_from_slice(&buf[..n]);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn full_destination_fails_with_write_error() {
        let body = vec![0xABu8; 4096];
        let input = cws_fixture(6, 0, &body);

        let mut sink = BoundedSink {
            written: Vec::new(),
            remaining: HEADER_LEN + 100,
        };
        let err = transcode(&input[..], &mut sink).unwrap_err();
        assert!(matches!(err, TranscodeError::Write(_)));
        assert_eq!(&sink.written[..3], b"FWS", "header written before body");
        assert_eq!(sink.written.len(), HEADER_LEN + 100);
    }
}
