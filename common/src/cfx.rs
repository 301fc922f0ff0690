// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CFX (draft-ietf-krb-wg-gssapi-cfx) upcall record.
//
// No kernel-side layout is defined for CFX contexts yet. Writing an RFC 1964
// record for one would install the wrong keys in the kernel, so every CFX
// context is refused.

use tracing::error;

use crate::context::ContextFields;
use crate::error::ExportError;
use crate::writer::SerializedRecord;

pub fn build(
    protocol: u32,
    _fields: &ContextFields<'_>,
) -> Result<SerializedRecord, ExportError> {
    error!(protocol, "CFX context serialization is not implemented");
    Err(ExportError::UnsupportedVariant { protocol })
}
