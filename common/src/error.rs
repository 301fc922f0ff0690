// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error taxonomy for context export.
//
// Every variant of ExportError is fatal to a single export call. Release
// failures after a build are not errors at this level; they are logged as
// warnings by the entry point and never reach the caller.

use std::fmt;

/// GSS-API major/minor status pair returned by a failed library call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GssStatus {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for GssStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "major {:#x}, minor {}", self.major, self.minor)
    }
}

/// Bound violations raised by [`crate::writer::RecordWriter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("write of {needed} bytes exceeds remaining capacity {remaining}")]
    Overflow { needed: usize, remaining: usize },

    #[error("opaque length prefix does not fit: {remaining} bytes remaining")]
    PrefixOverflow { remaining: usize },

    #[error("opaque payload of {len} bytes cannot be described by a 32-bit prefix")]
    OpaqueTooLong { len: usize },
}

/// Failures turning a context handle into a readable view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("gss_export_lucid_sec_context failed: {0}")]
    Library(GssStatus),

    #[error("unsupported lucid sec context version {0}")]
    UnsupportedVersion(u32),

    #[error("malformed context: {0}")]
    Malformed(&'static str),
}

/// Failures decoding a record that claims to be RFC 1964.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("record of {0} bytes exceeds the upcall limit")]
    TooLong(usize),

    #[error("record truncated in field {field}")]
    Truncated { field: &'static str },

    #[error("{0} trailing bytes after the last key block")]
    TrailingBytes(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("context extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("record capacity exceeded: {0}")]
    CapacityExceeded(#[from] WriteError),

    #[error("no record builder for protocol revision {protocol}")]
    UnsupportedVariant { protocol: u32 },
}

impl ExportError {
    /// Short, stable label for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::Extraction(_) => "extraction",
            ExportError::CapacityExceeded(_) => "capacity",
            ExportError::UnsupportedVariant { .. } => "unsupported-variant",
        }
    }
}
