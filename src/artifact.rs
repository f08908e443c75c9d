// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! On-disk format for one materialized feature column.
//!
//! ```text
//! ┌──────────────────────────── header (12 bytes) ───────────────────────────┐
//! │ "RFEA" │ version u8 │ dtype u8 │ reserved [0; 2] │ rows u32 (LE)          │
//! ├──────────────────────────────── body ────────────────────────────────────┤
//! │ rows × 8 bytes: i64 (dtype 0) or f64 (dtype 1), little-endian            │
//! ├─────────────────────────── footer (8 bytes) ─────────────────────────────┤
//! │ CRC32 of header + body (LE) │ "AEFR"                                     │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The footer is checked before anything else is parsed. A file that fails the
//! checksum or has the wrong trailing magic was truncated or corrupted, and is
//! rejected as a whole.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{Error, Result};
use crate::schema::ColumnType;
use crate::table::ColumnValues;

/// Header magic: "RFEA".
pub const MAGIC: [u8; 4] = *b"RFEA";

/// Footer magic: "AEFR" (header magic reversed).
pub const FOOTER_MAGIC: [u8; 4] = *b"AEFR";

pub const VERSION: u8 = 1;

/// File extension of a single-column artifact.
pub const EXTENSION: &str = "feat";

/// `<label>.<feature>.feat`, e.g. `valid.count_of_query_unigram.feat`.
pub fn artifact_file_name(label: &str, feature: &str) -> String {
    format!("{label}.{feature}.{EXTENSION}")
}

fn dtype_byte(ty: ColumnType) -> u8 {
    match ty {
        ColumnType::Int => 0,
        ColumnType::Float => 1,
    }
}

fn dtype_from_byte(b: u8) -> Result<ColumnType> {
    match b {
        0 => Ok(ColumnType::Int),
        1 => Ok(ColumnType::Float),
        other => Err(Error::InvalidArtifact(format!("unknown dtype {other}"))),
    }
}

/// Fixed-size artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub version: u8,
    pub column_type: ColumnType,
    pub rows: u32,
}

impl ArtifactHeader {
    // 4 (magic) + 1 (version) + 1 (dtype) + 2 (reserved) + 4 (rows)
    pub const SIZE: usize = 12;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[..4].copy_from_slice(&MAGIC);
        buf[4] = self.version;
        buf[5] = dtype_byte(self.column_type);
        // buf[6..8] stays zero (reserved)
        buf[8..].copy_from_slice(&self.rows.to_le_bytes());
        buf
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)
            .map_err(|_| Error::InvalidArtifact("truncated header".to_string()))?;

        if buf[..4] != MAGIC {
            return Err(Error::InvalidArtifact(format!(
                "bad magic: expected RFEA, got {:?}",
                &buf[..4]
            )));
        }
        let version = buf[4];
        if version != VERSION {
            return Err(Error::InvalidArtifact(format!(
                "unsupported version {version} (this build reads {VERSION})"
            )));
        }
        Ok(Self {
            version,
            column_type: dtype_from_byte(buf[5])?,
            // buf[6..8] is reserved
            rows: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// CRC32 footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactFooter {
    pub crc32: u32,
}

impl ArtifactFooter {
    pub const SIZE: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[..4].copy_from_slice(&self.crc32.to_le_bytes());
        buf[4..].copy_from_slice(&FOOTER_MAGIC);
        buf
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::InvalidArtifact("too short for footer".to_string()));
        }
        let start = bytes.len() - Self::SIZE;
        if bytes[start + 4..] != FOOTER_MAGIC {
            return Err(Error::InvalidArtifact(format!(
                "bad footer magic: expected AEFR, got {:?}",
                &bytes[start + 4..]
            )));
        }
        let crc32 = u32::from_le_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]);
        Ok(Self { crc32 })
    }

    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Serialize a column to artifact bytes.
pub fn encode(values: &ColumnValues) -> Result<Vec<u8>> {
    let rows = u32::try_from(values.len()).map_err(|_| {
        Error::InvalidArtifact(format!("{} rows exceed the u32 row count", values.len()))
    })?;
    let header = ArtifactHeader {
        version: VERSION,
        column_type: values.column_type(),
        rows,
    };

    let mut buf =
        Vec::with_capacity(ArtifactHeader::SIZE + values.len() * 8 + ArtifactFooter::SIZE);
    buf.extend_from_slice(&header.to_bytes());
    match values {
        ColumnValues::Int(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_le_bytes())),
        ColumnValues::Float(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_le_bytes())),
    }
    let footer = ArtifactFooter {
        crc32: ArtifactFooter::compute_crc32(&buf),
    };
    buf.extend_from_slice(&footer.to_bytes());
    Ok(buf)
}

/// Parse and verify artifact bytes.
pub fn decode(bytes: &[u8]) -> Result<ColumnValues> {
    if bytes.len() < ArtifactHeader::SIZE + ArtifactFooter::SIZE {
        return Err(Error::InvalidArtifact(format!(
            "{} bytes is shorter than header and footer",
            bytes.len()
        )));
    }
    let footer = ArtifactFooter::read(bytes)?;
    let content = &bytes[..bytes.len() - ArtifactFooter::SIZE];
    let actual = ArtifactFooter::compute_crc32(content);
    if actual != footer.crc32 {
        return Err(Error::ChecksumMismatch {
            expected: footer.crc32,
            actual,
        });
    }

    let mut cursor = content;
    let header = ArtifactHeader::read(&mut cursor)?;
    let body = cursor;
    let rows = header.rows as usize;
    if body.len() != rows * 8 {
        return Err(Error::InvalidArtifact(format!(
            "body is {} bytes, header declares {rows} rows",
            body.len()
        )));
    }

    let words = body.chunks_exact(8).map(|c| {
        let mut w = [0u8; 8];
        w.copy_from_slice(c);
        w
    });
    Ok(match header.column_type {
        ColumnType::Int => ColumnValues::Int(words.map(i64::from_le_bytes).collect()),
        ColumnType::Float => ColumnValues::Float(words.map(f64::from_le_bytes).collect()),
    })
}

pub fn write_artifact(path: &Path, values: &ColumnValues) -> Result<()> {
    let bytes = encode(values)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

pub fn read_artifact(path: &Path) -> Result<ColumnValues> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    decode(&bytes)
}
