// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Portable snapshot extraction via the krb5 "lucid" context API.
//
// The library exports a versioned, read-only copy of the context state and
// expects it back through its own free routine. Only version 1 is understood;
// anything else is returned to the library and reported as a failure.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ContextExtractor, ContextView};
use crate::context::{ContextFields, KeyBlock, WireVariant, KRB5_MECH_OID, ZERO_SEED};
use crate::error::{ExtractError, GssStatus};

/// The only lucid context version this exporter understands.
pub const LUCID_VERSION_1: u32 = 1;

/// RFC 1964 key data of a lucid v1 context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rfc1964KeyData {
    pub sign_alg: u32,
    pub seal_alg: u32,
    pub ctx_key: KeyBlock,
}

/// CFX key data of a lucid v1 context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfxKeyData {
    pub ctx_key: KeyBlock,
    #[serde(default)]
    pub acceptor_subkey: Option<KeyBlock>,
}

/// `gss_krb5_lucid_context_v1_t`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LucidContextV1 {
    pub initiate: bool,
    pub endtime: u32,
    pub send_seq: u64,
    #[serde(default)]
    pub recv_seq: u64,
    /// 0 = RFC 1964, nonzero = CFX.
    pub protocol: u32,
    pub rfc1964_kd: Rfc1964KeyData,
    #[serde(default)]
    pub cfx_kd: Option<CfxKeyData>,
}

/// A lucid context as returned by the library, tagged with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LucidContext {
    V1(LucidContextV1),
    /// A layout this exporter cannot read. Still owned by the caller and
    /// must be freed.
    Other { version: u32 },
}

impl LucidContext {
    pub fn version(&self) -> u32 {
        match self {
            LucidContext::V1(_) => LUCID_VERSION_1,
            LucidContext::Other { version } => *version,
        }
    }
}

/// The two library entry points the portable strategy depends on.
pub trait LucidApi {
    type Handle: ?Sized;

    /// `gss_export_lucid_sec_context`, asking for `version`.
    fn export_lucid_sec_context(
        &self,
        handle: &Self::Handle,
        version: u32,
    ) -> Result<LucidContext, GssStatus>;

    /// `gss_free_lucid_sec_context`.
    fn free_lucid_sec_context(&self, ctx: LucidContext) -> Result<(), GssStatus>;
}

impl<T: LucidApi + ?Sized> LucidApi for &T {
    type Handle = T::Handle;

    fn export_lucid_sec_context(
        &self,
        handle: &Self::Handle,
        version: u32,
    ) -> Result<LucidContext, GssStatus> {
        (**self).export_lucid_sec_context(handle, version)
    }

    fn free_lucid_sec_context(&self, ctx: LucidContext) -> Result<(), GssStatus> {
        (**self).free_lucid_sec_context(ctx)
    }
}

/// Extraction through the lucid API.
#[derive(Debug, Clone)]
pub struct PortableSnapshot<A> {
    api: A,
}

impl<A: LucidApi> PortableSnapshot<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

/// A version 1 lucid context held for the duration of one export.
#[derive(Debug)]
pub struct LucidView {
    ctx: LucidContextV1,
}

impl LucidView {
    pub fn context(&self) -> &LucidContextV1 {
        &self.ctx
    }
}

impl ContextView for LucidView {
    fn variant(&self) -> WireVariant {
        WireVariant::from_protocol(self.ctx.protocol)
    }

    fn fields(&self) -> ContextFields<'_> {
        let kd = &self.ctx.rfc1964_kd;
        ContextFields {
            initiate: self.ctx.initiate,
            // lucid contexts carry no seed
            seed_init: false,
            seed: ZERO_SEED,
            sign_alg: kd.sign_alg,
            seal_alg: kd.seal_alg,
            endtime: self.ctx.endtime,
            send_seq: self.ctx.send_seq,
            mech: KRB5_MECH_OID,
            ctx_key: kd.ctx_key.as_block_ref(),
        }
    }
}

impl<A: LucidApi> ContextExtractor for PortableSnapshot<A> {
    type Handle = A::Handle;
    type View = LucidView;

    const STRATEGY: &'static str = "lucid";

    fn extract(&self, handle: &Self::Handle) -> Result<LucidView, ExtractError> {
        let exported = self
            .api
            .export_lucid_sec_context(handle, LUCID_VERSION_1)
            .map_err(|status| {
                debug!(%status, "gss_export_lucid_sec_context failed");
                ExtractError::Library(status)
            })?;

        match exported {
            LucidContext::V1(ctx) => Ok(LucidView { ctx }),
            other => {
                let version = other.version();
                debug!(version, "unsupported lucid sec context version");
                if let Err(status) = self.api.free_lucid_sec_context(other) {
                    warn!(%status, "failed to free lucid sec context");
                }
                Err(ExtractError::UnsupportedVersion(version))
            }
        }
    }

    fn release(&self, view: LucidView) -> Result<(), ExtractError> {
        self.api
            .free_lucid_sec_context(LucidContext::V1(view.ctx))
            .map_err(ExtractError::Library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture::{sample_context, FixtureLucid};

    #[test]
    fn extracts_v1_with_substituted_fields() {
        let lucid = FixtureLucid::new();
        let snapshot = PortableSnapshot::new(&lucid);
        let ctx = sample_context();

        let view = snapshot.extract(&ctx).unwrap();
        let fields = view.fields();
        assert!(!fields.seed_init);
        assert_eq!(fields.seed, ZERO_SEED);
        assert_eq!(fields.mech, KRB5_MECH_OID);
        assert_eq!(fields.ctx_key.enctype, ctx.rfc1964_kd.ctx_key.enctype);
        assert_eq!(view.variant(), WireVariant::Rfc1964);

        snapshot.release(view).unwrap();
        assert_eq!(lucid.exports(), 1);
        assert_eq!(lucid.frees(), 1);
    }

    #[test]
    fn rejects_and_frees_other_versions() {
        let lucid = FixtureLucid::new().with_version(2);
        let snapshot = PortableSnapshot::new(&lucid);

        let err = snapshot.extract(&sample_context()).unwrap_err();
        assert_eq!(err, ExtractError::UnsupportedVersion(2));
        assert_eq!(lucid.exports(), 1);
        assert_eq!(lucid.frees(), 1);
    }

    #[test]
    fn library_failure_acquires_nothing() {
        let status = GssStatus {
            major: 0x000d_0000,
            minor: 3,
        };
        let lucid = FixtureLucid::new().failing_export(status);
        let snapshot = PortableSnapshot::new(&lucid);

        let err = snapshot.extract(&sample_context()).unwrap_err();
        assert_eq!(err, ExtractError::Library(status));
        assert_eq!(lucid.exports(), 0);
        assert_eq!(lucid.frees(), 0);
    }

    #[test]
    fn nonzero_protocol_is_cfx() {
        let lucid = FixtureLucid::new();
        let snapshot = PortableSnapshot::new(&lucid);
        let mut ctx = sample_context();
        ctx.protocol = 1;

        let view = snapshot.extract(&ctx).unwrap();
        assert_eq!(view.variant(), WireVariant::Cfx { protocol: 1 });
        snapshot.release(view).unwrap();
    }
}
