//! Unswf: SWF container transcoding from compressed (`CWS`) to
//! uncompressed (`FWS`) form.
//!
//! The crate provides:
//! - Header parsing and rewriting (`header`)
//! - The streaming decompression pipeline (`transcode`)
//! - File-oriented helpers with atomic output placement (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let stats = unswf::io::uncompress_file(
//!     Path::new("movie.swf"),
//!     Path::new("movie-uncompressed.swf"),
//! ).unwrap();
//! println!("wrote {} bytes", stats.output_size);
//! ```

pub mod header;
pub mod io;
pub mod transcode;

#[cfg(feature = "cli")]
pub mod cli;
