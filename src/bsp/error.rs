// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::{fmt, io};

use crate::bsp::lump::LumpKind;

use thiserror::Error;

/// Errors produced while decoding a BSP file.
///
/// Every error is terminal for the load that produced it; no partially decoded model is ever
/// returned alongside one.
#[derive(Error, Debug)]
pub enum BspError {
    #[error("Truncated or invalid BSP header: {0}")]
    Format(String),
    #[error("Corrupt {lump} lump: {problem}")]
    CorruptLump { lump: LumpKind, problem: LumpProblem },
    #[error("Malformed face {face}: {problem}")]
    MalformedFace { face: usize, problem: FaceProblem },
    #[error("Entity syntax error on line {line} ({text:?}): {expected}")]
    EntitySyntax {
        line: usize,
        text: String,
        expected: &'static str,
    },
    #[error("Invalid value for entity key {key}: {value:?}")]
    EntityValue { key: String, value: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BspError {
    pub(crate) fn corrupt(lump: LumpKind, problem: LumpProblem) -> BspError {
        BspError::CorruptLump { lump, problem }
    }

    pub(crate) fn malformed(face: usize, problem: FaceProblem) -> BspError {
        BspError::MalformedFace { face, problem }
    }
}

/// What was wrong with a lump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LumpProblem {
    /// The lump length is not a whole number of records.
    BadLength { length: usize, record_size: usize },

    /// The directory entry points past the end of the file.
    Truncated { offset: u32, length: u32 },

    /// A record refers to an index outside the range it is allowed to address.
    IndexOutOfRange {
        record: usize,
        index: u64,
        bound: usize,
    },

    TooManyRecords { count: usize, max: usize },

    InvalidFaceKind { record: usize, kind: u32 },

    /// The entity lump is not valid UTF-8.
    NotText,
}

impl fmt::Display for LumpProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LumpProblem::BadLength {
                length,
                record_size,
            } => write!(
                f,
                "length {} is not a multiple of the record size {}",
                length, record_size
            ),
            LumpProblem::Truncated { offset, length } => write!(
                f,
                "{} bytes at offset 0x{:08x} extend past the end of the file",
                length, offset
            ),
            LumpProblem::IndexOutOfRange {
                record,
                index,
                bound,
            } => write!(
                f,
                "record {} refers to index {} (valid range is 0..{})",
                record, index, bound
            ),
            LumpProblem::TooManyRecords { count, max } => {
                write!(f, "{} records exceeds the limit of {}", count, max)
            }
            LumpProblem::InvalidFaceKind { record, kind } => {
                write!(f, "record {} has unknown face type {}", record, kind)
            }
            LumpProblem::NotText => write!(f, "entity data is not valid UTF-8"),
        }
    }
}

/// What was wrong with a face that otherwise decoded cleanly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaceProblem {
    MeshVertCount,
    PatchGridSize,
}

impl fmt::Display for FaceProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FaceProblem::MeshVertCount => write!(f, "meshvert count not divisible by 3"),
            FaceProblem::PatchGridSize => write!(f, "patch grid size mismatch"),
        }
    }
}
