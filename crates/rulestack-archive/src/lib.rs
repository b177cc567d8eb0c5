//! Deterministic tar+gzip archive codec for RuleStack packages.
//!
//! Packing hashes the *compressed* byte stream as it is written, so the
//! SHA-256 [`pack`] and [`pack_from_directory`] report is exactly the hash a
//! caller would get from hashing the resulting file independently (see
//! [`calculate_sha256`]). Extraction is validated up front against
//! path-traversal, non-regular entries, and oversized entries before a single
//! byte is written to disk.

mod error;
mod pack;
mod unpack;
mod validate;

pub use error::ArchiveError;
pub use pack::{calculate_sha256, pack, pack_from_directory, PackResult};
pub use unpack::{read_manifest_bytes, unpack, unpack_validated};
pub use validate::{validate_archive, MAX_FILE_SIZE};
