// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction strategies: established context handle → ContextView.
//
//   lucid    gss_export_lucid_sec_context v1 (stable library API)
//   overlay  private krb5_gss_ctx_id_rec layout (feature "legacy-overlay",
//            MIT releases without the lucid API)
//
// The strategy is the extractor type a caller builds with; the export entry
// point only sees the traits below.

pub mod fixture;
pub mod lucid;
#[cfg(feature = "legacy-overlay")]
#[allow(unsafe_code)]
pub mod overlay;

use crate::context::{ContextFields, WireVariant};
use crate::error::ExtractError;

/// A structured, read-only view of an established context.
pub trait ContextView {
    /// Wire format this context must be exported in.
    fn variant(&self) -> WireVariant;

    fn fields(&self) -> ContextFields<'_>;
}

/// Turns a context handle into a [`ContextView`] and gives it back afterwards.
///
/// `release` takes the view by value: every view obtained from `extract` is
/// released at most once, and the entry point releases it on every path.
pub trait ContextExtractor {
    type Handle: ?Sized;
    type View: ContextView;

    /// Name used in diagnostics.
    const STRATEGY: &'static str;

    fn extract(&self, handle: &Self::Handle) -> Result<Self::View, ExtractError>;

    fn release(&self, view: Self::View) -> Result<(), ExtractError>;
}
