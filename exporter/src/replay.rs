// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Replay captured lucid contexts and describe records.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;
use kctx_common::extract::fixture::FixtureLucid;
use kctx_common::extract::lucid::{LucidContextV1, PortableSnapshot};
use kctx_common::rfc1964::{self, Rfc1964Record};
use kctx_common::{export_context, ExportError, SerializedRecord};

use crate::config::OutputFormat;
use crate::output;

/// Parse a captured context. Key material is base64.
pub fn parse_context(json: &str) -> anyhow::Result<LucidContextV1> {
    serde_json::from_str(json).context("invalid lucid context capture")
}

pub fn load_context(path: &Path) -> anyhow::Result<LucidContextV1> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_context(&json)
}

/// Run `ctx` through the lucid export path as the library would hand it over.
pub fn replay(ctx: &LucidContextV1) -> Result<SerializedRecord, ExportError> {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);
    export_context(&snapshot, ctx)
}

/// Decode a record file's contents in `format` and list its fields.
pub fn inspect(raw: &[u8], format: OutputFormat) -> anyhow::Result<String> {
    let bytes = output::decode(raw, format)?;
    let record = rfc1964::parse(&bytes)
        .with_context(|| format!("not an RFC 1964 record in {format:?} encoding"))?;
    Ok(describe(&record))
}

/// Human-readable field listing. Key bytes are never shown.
pub fn describe(record: &Rfc1964Record) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "initiate:    {}", record.initiate);
    let _ = writeln!(out, "seed_init:   {}", record.seed_init);
    let _ = writeln!(out, "signalg:     {}", record.sign_alg);
    let _ = writeln!(out, "sealalg:     {}", record.seal_alg);
    let _ = writeln!(out, "endtime:     {}", record.endtime);
    let _ = writeln!(out, "send_seq:    {}", record.send_seq);
    let _ = writeln!(out, "mech:        {}", hex::encode(&record.mech));
    let _ = writeln!(
        out,
        "derived key: enctype {} length {}",
        record.derived_key.enctype,
        record.derived_key.data.len()
    );
    let _ = writeln!(
        out,
        "context key: enctype {} length {}",
        record.ctx_key.enctype,
        record.ctx_key.data.len()
    );
    out
}
