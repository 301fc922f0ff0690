// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export entry point: extract → dispatch → build → release.
//
// The extracted view is released exactly once, after the builder has run,
// whether or not the build succeeded. A release failure is only a warning:
// by then the record is either complete or already discarded.

use tracing::{error, warn};

use crate::cfx;
use crate::context::WireVariant;
use crate::error::ExportError;
use crate::extract::{ContextExtractor, ContextView};
use crate::rfc1964;
use crate::writer::SerializedRecord;

/// Serialize an established context for the kernel upcall.
///
/// On failure no record exists; the error is logged here and returned so the
/// negotiation layer can decide what to do next.
pub fn export_context<E: ContextExtractor>(
    extractor: &E,
    handle: &E::Handle,
) -> Result<SerializedRecord, ExportError> {
    let result = extract_build_release(extractor, handle);
    if let Err(ref e) = result {
        error!(
            strategy = E::STRATEGY,
            kind = e.kind(),
            error = %e,
            "failed serializing krb5 context for kernel"
        );
    }
    result
}

fn extract_build_release<E: ContextExtractor>(
    extractor: &E,
    handle: &E::Handle,
) -> Result<SerializedRecord, ExportError> {
    let view = extractor.extract(handle)?;

    let built = build_record(&view);

    if let Err(e) = extractor.release(view) {
        warn!(strategy = E::STRATEGY, error = %e, "failed to free extracted context");
    }

    built
}

/// Pick the builder for the view's wire variant and run it.
pub fn build_record<V: ContextView>(view: &V) -> Result<SerializedRecord, ExportError> {
    let fields = view.fields();
    match view.variant() {
        WireVariant::Rfc1964 => Ok(rfc1964::build(&fields)?),
        WireVariant::Cfx { protocol } => cfx::build(protocol, &fields),
    }
}
