// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kctx Common: Kerberos GSS context export for the kernel RPCSEC_GSS upcall
//
// Pipeline:
//   extract   established context handle → ContextView (lucid v1 or legacy overlay)
//   dispatch  protocol revision → RFC1964 builder | CFX stub (fails closed)
//   build     bounded appends into a single 4096-byte buffer
//   release   extraction-owned resources, exactly once, on every exit path

#![deny(unsafe_code)]

pub mod cfx;
pub mod context;
pub mod error;
pub mod export;
pub mod extract;
pub mod rfc1964;
pub mod writer;

pub use context::{ContextFields, KeyBlock, KeyBlockRef, WireVariant};
pub use error::{ExportError, ExtractError, GssStatus, ParseError, WriteError};
pub use export::export_context;
pub use extract::{ContextExtractor, ContextView};
pub use writer::{RecordWriter, SerializedRecord, MAX_CTX_LEN};
