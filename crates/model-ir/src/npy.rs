// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Minimal NPY (NumPy array file) reader.
//!
//! Trace files are standard dense NPY containers: a magic string, a
//! version, a Python-dict header carrying `descr`, `fortran_order`, and
//! `shape`, then raw little-endian payload. The captured traces are always
//! C-ordered `<f4`; anything else is rejected.
//!
//! Files are memory-mapped and the payload is copied out into an owned
//! `Vec<f32>` — the map lives only for the duration of the load.

use crate::ModelError;
use std::path::Path;

const MAGIC: &[u8] = b"\x93NUMPY";

/// Reads an NPY file into a shape vector and an owned `f32` buffer.
pub(crate) fn read(path: &Path) -> Result<(Vec<usize>, Vec<f32>), ModelError> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the mapping is read-only and dropped before this function
    // returns; trace files are not mutated while the model runs.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    parse(path, &mmap)
}

fn parse(path: &Path, bytes: &[u8]) -> Result<(Vec<usize>, Vec<f32>), ModelError> {
    let malformed = |detail: &str| ModelError::MalformedNpy {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    };

    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(malformed("missing NPY magic"));
    }
    let (major, minor) = (bytes[6], bytes[7]);

    // Version 1.0 uses a 2-byte header length; 2.0 widens it to 4 bytes.
    let (header_len, header_start) = match (major, minor) {
        (1, 0) => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        (2, 0) => {
            if bytes.len() < 12 {
                return Err(malformed("truncated v2 header length"));
            }
            (
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
                12,
            )
        }
        _ => return Err(malformed(&format!("unsupported version {major}.{minor}"))),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(malformed("truncated header"));
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| malformed("header is not valid UTF-8"))?;

    // descr: only little-endian f32 payloads are accepted.
    let descr = quoted_value(header, "'descr'").ok_or_else(|| malformed("missing 'descr'"))?;
    if descr != "<f4" {
        return Err(ModelError::UnsupportedNpy {
            path: path.to_path_buf(),
            detail: format!("dtype '{descr}' (expected '<f4')"),
        });
    }

    // fortran_order: the engine indexes row-major.
    let order = keyword_value(header, "'fortran_order'")
        .ok_or_else(|| malformed("missing 'fortran_order'"))?;
    if order != "False" {
        return Err(ModelError::UnsupportedNpy {
            path: path.to_path_buf(),
            detail: "fortran-ordered payload".to_string(),
        });
    }

    let shape = shape_value(header).ok_or_else(|| malformed("missing or invalid 'shape'"))?;

    let num_elements = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| malformed("shape overflows"))?;
    let payload_len = num_elements
        .checked_mul(4)
        .ok_or_else(|| malformed("shape overflows"))?;
    let payload = &bytes[data_start..];
    if payload.len() < payload_len {
        return Err(malformed(&format!(
            "payload holds {} bytes, shape needs {payload_len}",
            payload.len(),
        )));
    }

    let data = payload[..payload_len]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok((shape, data))
}

/// Extracts a quoted string value following `key` in the header dict.
fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let rest = header.split_once(key)?.1;
    let rest = rest.split_once(':')?.1;
    let rest = rest.trim_start();
    let quote = rest.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    rest[1..].split(quote).next()
}

/// Extracts a bare keyword (`True` / `False`) following `key`.
fn keyword_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let rest = header.split_once(key)?.1;
    let rest = rest.split_once(':')?.1.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Extracts the shape tuple. `(5,)` and `()` are valid spellings.
fn shape_value(header: &str) -> Option<Vec<usize>> {
    let rest = header.split_once("'shape'")?.1;
    let rest = rest.split_once('(')?.1;
    let tuple = rest.split_once(')')?.0;
    let mut dims = Vec::new();
    for part in tuple.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        dims.push(part.parse().ok()?);
    }
    Some(dims)
}

/// Test-only NPY writer, shared with the trace loader tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::MAGIC;
    use std::io::Write;
    use std::path::Path;

    /// Writes a minimal v1.0 NPY file the way `numpy.save` lays it out.
    pub(crate) fn write_npy(path: &Path, dims: &[usize], values: &[f32]) {
        let shape = match dims.len() {
            0 => "()".to_string(),
            1 => format!("({},)", dims[0]),
            _ => format!(
                "({})",
                dims.iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let mut header =
            format!("{{'descr': '<f4', 'fortran_order': False, 'shape': {shape}, }}");
        // Pad so that the payload starts on a 64-byte boundary.
        let unpadded = MAGIC.len() + 4 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(MAGIC).unwrap();
        f.write_all(&[1, 0]).unwrap();
        f.write_all(&(header.len() as u16).to_le_bytes()).unwrap();
        f.write_all(header.as_bytes()).unwrap();
        for v in values {
            f.write_all(&v.to_le_bytes()).unwrap();
        }
    }
}
