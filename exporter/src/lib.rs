// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! kctx exporter
//!
//! Diagnostic front end for `kctx-common`:
//!
//! - replay a captured lucid context (JSON) into the exact record the kernel
//!   upcall would receive
//! - decode an existing record back into its RFC 1964 fields

pub mod config;
pub mod output;
pub mod replay;

pub use config::{ExporterConfig, LogFormat, OutputFormat};
