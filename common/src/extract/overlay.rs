// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Legacy overlay extraction for MIT krb5 releases without the lucid API.
//
// This reads the library's PRIVATE context structure through hand-maintained
// #[repr(C)] mirrors. Nothing here is a stable interface: the mirrors match
// the pre-1.3.2 krb5_gss_ctx_id_rec (plain int fields, 32-bit sequence
// numbers, no protocol revision) reached through the mechglue union context.
// Those releases only speak RFC 1964, so the view always dispatches there.
//
// All unsafe code in the crate lives in this module. Everything the export
// needs is copied out during `extract`; the library's memory is never
// written and no pointer outlives the call.

use std::ffi::{c_int, c_uint, c_void};
use std::ptr::NonNull;
use std::slice;

use tracing::trace;

use super::{ContextExtractor, ContextView};
use crate::context::{ContextFields, KeyBlock, WireVariant, SEED_LEN};
use crate::error::ExtractError;

/// `gss_OID_desc`.
#[repr(C)]
#[derive(Debug)]
pub struct GssOidDesc {
    pub length: u32,
    pub elements: *const c_void,
}

/// `gss_union_ctx_id_desc`: the mechglue wrapper around the mechanism's
/// own context.
#[repr(C)]
#[derive(Debug)]
pub struct GssUnionCtxDesc {
    pub mech_type: *const GssOidDesc,
    pub internal_ctx_id: *const Krb5GssCtxRec,
}

/// `krb5_keyblock`.
#[repr(C)]
#[derive(Debug)]
pub struct Krb5Keyblock {
    pub magic: i32,
    pub enctype: i32,
    pub length: c_uint,
    pub contents: *const u8,
}

/// `krb5_gss_ctx_id_rec`, pre-1.3.2 layout.
#[repr(C)]
#[derive(Debug)]
pub struct Krb5GssCtxRec {
    pub initiate: c_int,
    pub gss_flags: u32,
    pub seed_init: c_int,
    pub seed: [u8; SEED_LEN],
    pub here: *const c_void,
    pub there: *const c_void,
    pub subkey: *const Krb5Keyblock,
    pub signalg: c_int,
    pub cksum_size: c_int,
    pub sealalg: c_int,
    pub enc: *const Krb5Keyblock,
    pub seq: *const Krb5Keyblock,
    pub endtime: i32,
    pub krb_flags: i32,
    pub seq_send: u32,
    pub seq_recv: u32,
    pub seqstate: *mut c_void,
    pub established: c_int,
    pub big_endian: c_int,
    pub auth_context: *mut c_void,
    pub mech_used: *const GssOidDesc,
    pub nctypes: c_int,
    pub ctypes: *const i32,
}

/// A `gss_ctx_id_t` produced by a pre-lucid MIT library.
#[derive(Debug, Clone, Copy)]
pub struct RawContextHandle(NonNull<GssUnionCtxDesc>);

impl RawContextHandle {
    /// Wrap a raw `gss_ctx_id_t`. Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ctx` must point to a live, established union context created by a
    /// krb5 mechanism whose private layout is [`Krb5GssCtxRec`]. The context
    /// and everything it points to must stay valid and unmodified while the
    /// handle is used for an export.
    pub unsafe fn from_raw(ctx: *const c_void) -> Option<Self> {
        NonNull::new(ctx.cast_mut().cast::<GssUnionCtxDesc>()).map(Self)
    }
}

/// Extraction through the private context layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyOverlay;

/// Fields copied out of a legacy context.
#[derive(Debug)]
pub struct OverlayView {
    initiate: bool,
    seed_init: bool,
    seed: [u8; SEED_LEN],
    sign_alg: u32,
    seal_alg: u32,
    endtime: u32,
    send_seq: u32,
    seq_recv: u32,
    mech: Vec<u8>,
    seq_key: KeyBlock,
    enc_key: Option<KeyBlock>,
}

impl OverlayView {
    pub fn seq_recv(&self) -> u32 {
        self.seq_recv
    }

    /// The library's own encryption key, if it had one.
    pub fn enc_key(&self) -> Option<&KeyBlock> {
        self.enc_key.as_ref()
    }
}

impl ContextView for OverlayView {
    fn variant(&self) -> WireVariant {
        WireVariant::Rfc1964
    }

    fn fields(&self) -> ContextFields<'_> {
        ContextFields {
            initiate: self.initiate,
            seed_init: self.seed_init,
            seed: self.seed,
            sign_alg: self.sign_alg,
            seal_alg: self.seal_alg,
            endtime: self.endtime,
            send_seq: u64::from(self.send_seq),
            mech: &self.mech,
            ctx_key: self.seq_key.as_block_ref(),
        }
    }
}

impl ContextExtractor for LegacyOverlay {
    type Handle = RawContextHandle;
    type View = OverlayView;

    const STRATEGY: &'static str = "legacy-overlay";

    fn extract(&self, handle: &RawContextHandle) -> Result<OverlayView, ExtractError> {
        // SAFETY: from_raw's contract guarantees a live union context.
        let wrapper = unsafe { handle.0.as_ref() };
        // SAFETY: a non-null internal_ctx_id of a krb5 union context points
        // to its krb5_gss_ctx_id_rec.
        let kctx = unsafe { wrapper.internal_ctx_id.as_ref() }
            .ok_or(ExtractError::Malformed("null internal context"))?;

        // SAFETY: the seq keyblock of a live context is null or holds
        // `length` bytes at `contents`.
        let seq_key = unsafe { read_keyblock(kctx.seq) }?
            .ok_or(ExtractError::Malformed("missing seq keyblock"))?;
        // SAFETY: same contract as seq; enc is null for contexts that never
        // set up sealing.
        let enc_key = unsafe { read_keyblock(kctx.enc) }?;
        // SAFETY: mech_used is null or an OID whose `elements` holds
        // `length` bytes.
        let mech = unsafe { read_oid(kctx.mech_used) }?;

        trace!(
            seq_recv = kctx.seq_recv,
            auth_context = ?kctx.auth_context,
            established = kctx.established,
            "read legacy krb5 context"
        );

        // int fields go on the wire with their bit patterns unchanged
        Ok(OverlayView {
            initiate: kctx.initiate != 0,
            seed_init: kctx.seed_init != 0,
            seed: kctx.seed,
            sign_alg: kctx.signalg as u32,
            seal_alg: kctx.sealalg as u32,
            endtime: kctx.endtime as u32,
            send_seq: kctx.seq_send,
            seq_recv: kctx.seq_recv,
            mech,
            seq_key,
            enc_key,
        })
    }

    fn release(&self, _view: OverlayView) -> Result<(), ExtractError> {
        // The view is a copy; the context stays owned by the library.
        Ok(())
    }
}

/// # Safety
///
/// `kb` is null or points to a keyblock whose `contents` holds `length` bytes.
unsafe fn read_keyblock(kb: *const Krb5Keyblock) -> Result<Option<KeyBlock>, ExtractError> {
    let Some(kb) = kb.as_ref() else {
        return Ok(None);
    };
    let data = read_bytes(kb.contents, kb.length as usize, "null keyblock contents")?;
    Ok(Some(KeyBlock::new(kb.enctype as u32, data)))
}

/// # Safety
///
/// `oid` is null or points to an OID whose `elements` holds `length` bytes.
unsafe fn read_oid(oid: *const GssOidDesc) -> Result<Vec<u8>, ExtractError> {
    let oid = oid
        .as_ref()
        .ok_or(ExtractError::Malformed("null mech_used"))?;
    read_bytes(oid.elements.cast::<u8>(), oid.length as usize, "null OID elements")
}

/// # Safety
///
/// `ptr` is valid for reads of `len` bytes whenever `len` is nonzero.
unsafe fn read_bytes(
    ptr: *const u8,
    len: usize,
    what: &'static str,
) -> Result<Vec<u8>, ExtractError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(ExtractError::Malformed(what));
    }
    Ok(slice::from_raw_parts(ptr, len).to_vec())
}
