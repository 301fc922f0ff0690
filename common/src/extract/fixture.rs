// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory lucid library.
//
// Replays a captured LucidContextV1 as if the GSS library had exported it,
// and counts every export and free so callers can check that each acquired
// snapshot went back exactly once.

use std::cell::Cell;

use super::lucid::{LucidApi, LucidContext, LucidContextV1, Rfc1964KeyData, LUCID_VERSION_1};
use crate::context::KeyBlock;
use crate::error::GssStatus;

/// A [`LucidApi`] whose "context handles" are captured lucid contexts.
#[derive(Debug)]
pub struct FixtureLucid {
    version: u32,
    export_failure: Option<GssStatus>,
    free_failure: Option<GssStatus>,
    exports: Cell<usize>,
    frees: Cell<usize>,
}

impl FixtureLucid {
    pub fn new() -> Self {
        Self {
            version: LUCID_VERSION_1,
            export_failure: None,
            free_failure: None,
            exports: Cell::new(0),
            frees: Cell::new(0),
        }
    }

    /// Report `version` instead of 1 on export.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Fail every export with `status`.
    pub fn failing_export(mut self, status: GssStatus) -> Self {
        self.export_failure = Some(status);
        self
    }

    /// Fail every free with `status`. The free is still counted.
    pub fn failing_free(mut self, status: GssStatus) -> Self {
        self.free_failure = Some(status);
        self
    }

    /// Successful exports so far.
    pub fn exports(&self) -> usize {
        self.exports.get()
    }

    /// Free calls so far.
    pub fn frees(&self) -> usize {
        self.frees.get()
    }
}

impl Default for FixtureLucid {
    fn default() -> Self {
        Self::new()
    }
}

impl LucidApi for FixtureLucid {
    type Handle = LucidContextV1;

    fn export_lucid_sec_context(
        &self,
        handle: &LucidContextV1,
        _version: u32,
    ) -> Result<LucidContext, GssStatus> {
        if let Some(status) = self.export_failure {
            return Err(status);
        }
        self.exports.set(self.exports.get() + 1);

        if self.version == LUCID_VERSION_1 {
            Ok(LucidContext::V1(handle.clone()))
        } else {
            Ok(LucidContext::Other {
                version: self.version,
            })
        }
    }

    fn free_lucid_sec_context(&self, _ctx: LucidContext) -> Result<(), GssStatus> {
        self.frees.set(self.frees.get() + 1);
        match self.free_failure {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

/// An initiator-side RFC 1964 context with a 32-byte aes256 key `00..1f`.
///
/// signalg 1, sealalg 1, endtime 1700000000, send sequence 42.
pub fn sample_context() -> LucidContextV1 {
    LucidContextV1 {
        initiate: true,
        endtime: 1_700_000_000,
        send_seq: 42,
        recv_seq: 0,
        protocol: 0,
        rfc1964_kd: Rfc1964KeyData {
            sign_alg: 1,
            seal_alg: 1,
            ctx_key: KeyBlock::new(18, (0u8..32).collect()),
        },
        cfx_kd: None,
    }
}
