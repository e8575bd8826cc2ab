// File-level orchestration for the CWS-to-FWS transcode.
//
// `uncompress_file()` wraps the streaming pipeline with buffered I/O and
// temporary-file-plus-atomic-rename output placement: a reader of the
// output path sees either its prior content or the complete new file,
// never a partial write.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::debug;

use crate::header::{HeaderError, SwfHeader};
use crate::transcode::{self, TranscodeError, TranscodeStats};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level uncompression.
#[derive(Debug)]
pub enum UncompressError {
    /// The input file could not be opened.
    Open(PathBuf, io::Error),
    /// The input file already carries the `FWS` signature.
    AlreadyUncompressed(PathBuf),
    /// The transcode itself failed (header, decompression, read, write).
    Transcode(TranscodeError),
    /// A temporary file could not be created next to the output.
    CreateTemp(PathBuf, io::Error),
    /// The finished output could not be placed at the requested path.
    Rename(PathBuf, io::Error),
}

impl std::fmt::Display for UncompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(path, e) => write!(f, "cannot open {}: {e}", path.display()),
            Self::AlreadyUncompressed(path) => {
                write!(f, "{} is already uncompressed", path.display())
            }
            Self::Transcode(e) => write!(f, "{e}"),
            Self::CreateTemp(dir, e) => {
                write!(f, "cannot create temporary file in {}: {e}", dir.display())
            }
            Self::Rename(path, e) => write!(f, "cannot place output at {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for UncompressError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(_, e) | Self::CreateTemp(_, e) | Self::Rename(_, e) => Some(e),
            Self::AlreadyUncompressed(_) => None,
            Self::Transcode(e) => Some(e),
        }
    }
}

impl From<TranscodeError> for UncompressError {
    fn from(e: TranscodeError) -> Self {
        Self::Transcode(e)
    }
}

// ---------------------------------------------------------------------------
// uncompress_file
// ---------------------------------------------------------------------------

/// Uncompress the SWF file at `input`, placing the result at `output`.
///
/// The header is parsed before any destination artifact exists, so the
/// terminal conditions (already uncompressed, unrecognized signature,
/// truncated header) leave the output path untouched. The body streams
/// into a temporary file in the output's directory, which is promoted by
/// an atomic rename only after the transcode has fully succeeded. On any
/// failure the temporary file is removed and the output path keeps its
/// prior state.
pub fn uncompress_file(input: &Path, output: &Path) -> Result<TranscodeStats, UncompressError> {
    let input_file =
        File::open(input).map_err(|e| UncompressError::Open(input.to_path_buf(), e))?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let header = SwfHeader::read(&mut reader).map_err(|e| match e {
        HeaderError::AlreadyUncompressed => {
            UncompressError::AlreadyUncompressed(input.to_path_buf())
        }
        other => UncompressError::Transcode(TranscodeError::Header(other)),
    })?;

    // The temporary file must live in the output's directory: renaming
    // across filesystems is a copy, not an atomic replace.
    let out_dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(&temp_prefix(output))
        .tempfile_in(out_dir)
        .map_err(|e| UncompressError::CreateTemp(out_dir.to_path_buf(), e))?;
    debug!("writing into temporary file {}", temp.path().display());

    let mut writer = BufWriter::with_capacity(BUF_SIZE, temp);
    let stats = transcode::transcode_body(reader, &mut writer, &header)?;

    let temp = writer
        .into_inner()
        .map_err(|e| UncompressError::Transcode(TranscodeError::Write(e.into_error())))?;
    temp.persist(output)
        .map_err(|e| UncompressError::Rename(output.to_path_buf(), e.error))?;

    debug!(
        "placed {} uncompressed bytes at {}",
        stats.output_size,
        output.display()
    );
    Ok(stats)
}

fn temp_prefix(output: &Path) -> OsString {
    let mut prefix = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output.swf"));
    prefix.push(".");
    prefix
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
