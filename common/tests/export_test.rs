// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! End-to-end export of lucid contexts through the fixture library.

use kctx_common::context::{KeyBlock, KRB5_MECH_OID};
use kctx_common::extract::fixture::{sample_context, FixtureLucid};
use kctx_common::extract::lucid::{LucidContextV1, PortableSnapshot};
use kctx_common::rfc1964::{self, DERIVED_KEY_MASK, FIXED_FIELDS_LEN};
use kctx_common::{export_context, ExportError, ExtractError, GssStatus, MAX_CTX_LEN};
use proptest::prelude::*;

fn context_with_key(len: usize) -> LucidContextV1 {
    let mut ctx = sample_context();
    ctx.rfc1964_kd.ctx_key = KeyBlock::new(18, (0..len).map(|i| i as u8).collect());
    ctx
}

fn ne(v: u32) -> [u8; 4] {
    v.to_ne_bytes()
}

#[test]
fn test_reference_context_layout() {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);

    let record = export_context(&snapshot, &sample_context()).unwrap();
    let bytes = record.as_bytes();

    let mut expected = Vec::new();
    expected.extend_from_slice(&ne(1)); // initiate
    expected.extend_from_slice(&ne(0)); // seed_init
    expected.extend_from_slice(&[0u8; 16]); // seed
    expected.extend_from_slice(&ne(1)); // signalg
    expected.extend_from_slice(&ne(1)); // sealalg
    expected.extend_from_slice(&ne(1_700_000_000)); // endtime
    expected.extend_from_slice(&ne(42)); // send_seq
    expected.extend_from_slice(&ne(KRB5_MECH_OID.len() as u32));
    expected.extend_from_slice(KRB5_MECH_OID);
    expected.extend_from_slice(&ne(18));
    expected.extend_from_slice(&ne(32));
    expected.extend((0u8..32).map(|b| b ^ 0xf0));
    expected.extend_from_slice(&ne(18));
    expected.extend_from_slice(&ne(32));
    expected.extend(0u8..32);

    assert_eq!(bytes, expected.as_slice());
    assert_eq!(bytes[FIXED_FIELDS_LEN + 4 + 9 + 8], 0xf0);
    assert_eq!(*bytes.last().unwrap(), 0x1f);
}

#[cfg(target_endian = "little")]
#[test]
fn test_reference_prefix_on_little_endian() {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);
    let record = export_context(&snapshot, &sample_context()).unwrap();

    let bytes = record.as_bytes();
    assert_eq!(&bytes[..4], &[0x01, 0, 0, 0]);
    assert_eq!(&bytes[24..28], &[0x01, 0, 0, 0]);
    assert_eq!(&bytes[32..36], &1_700_000_000u32.to_le_bytes());
    assert_eq!(&bytes[36..40], &[0x2a, 0, 0, 0]);
}

#[test]
fn test_cfx_context_writes_nothing() {
    for protocol in [1, 2, u32::MAX] {
        let lucid = FixtureLucid::new();
        let snapshot = PortableSnapshot::new(&lucid);
        let mut ctx = sample_context();
        ctx.protocol = protocol;

        let result = export_context(&snapshot, &ctx);
        assert_eq!(result, Err(ExportError::UnsupportedVariant { protocol }));
        assert_eq!(lucid.exports(), lucid.frees());
    }
}

#[test]
fn test_export_is_idempotent() {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);
    let ctx = sample_context();

    let first = export_context(&snapshot, &ctx).unwrap();
    let second = export_context(&snapshot, &ctx).unwrap();
    assert_eq!(first, second);
    assert_eq!(lucid.exports(), 2);
    assert_eq!(lucid.frees(), 2);
}

#[test]
fn test_oversized_key_exceeds_capacity() {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);

    let err = export_context(&snapshot, &context_with_key(2100)).unwrap_err();
    assert!(matches!(err, ExportError::CapacityExceeded(_)));
    assert_eq!(lucid.exports(), 1);
    assert_eq!(lucid.frees(), 1);
}

#[test]
fn test_capacity_boundary() {
    let overhead = FIXED_FIELDS_LEN + 4 + KRB5_MECH_OID.len() + 2 * 8;
    let largest = (MAX_CTX_LEN - overhead) / 2;

    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);

    let record = export_context(&snapshot, &context_with_key(largest)).unwrap();
    assert!(record.len() <= MAX_CTX_LEN);

    let err = export_context(&snapshot, &context_with_key(largest + 1)).unwrap_err();
    assert!(matches!(err, ExportError::CapacityExceeded(_)));
}

#[test]
fn test_unsupported_version_is_balanced() {
    let lucid = FixtureLucid::new().with_version(3);
    let snapshot = PortableSnapshot::new(&lucid);

    let err = export_context(&snapshot, &sample_context()).unwrap_err();
    assert_eq!(
        err,
        ExportError::Extraction(ExtractError::UnsupportedVersion(3))
    );
    assert_eq!(lucid.exports(), 1);
    assert_eq!(lucid.frees(), 1);
}

#[test]
fn test_free_failure_after_cfx_refusal_keeps_refusal() {
    let lucid = FixtureLucid::new().failing_free(GssStatus { major: 1, minor: 5 });
    let snapshot = PortableSnapshot::new(&lucid);
    let mut ctx = sample_context();
    ctx.protocol = 1;

    let err = export_context(&snapshot, &ctx).unwrap_err();
    assert_eq!(err, ExportError::UnsupportedVariant { protocol: 1 });
    assert_eq!(lucid.exports(), 1);
    assert_eq!(lucid.frees(), 1);
}

#[test]
fn test_free_failure_after_unsupported_version_keeps_version_error() {
    let lucid = FixtureLucid::new()
        .with_version(2)
        .failing_free(GssStatus { major: 1, minor: 5 });
    let snapshot = PortableSnapshot::new(&lucid);

    let err = export_context(&snapshot, &sample_context()).unwrap_err();
    assert_eq!(
        err,
        ExportError::Extraction(ExtractError::UnsupportedVersion(2))
    );
    assert_eq!(lucid.exports(), 1);
    assert_eq!(lucid.frees(), 1);
}

#[test]
fn test_library_failure_is_balanced() {
    let status = GssStatus {
        major: 0x0009_0000,
        minor: 0,
    };
    let lucid = FixtureLucid::new().failing_export(status);
    let snapshot = PortableSnapshot::new(&lucid);

    let err = export_context(&snapshot, &sample_context()).unwrap_err();
    assert_eq!(err, ExportError::Extraction(ExtractError::Library(status)));
    assert_eq!(lucid.exports(), 0);
    assert_eq!(lucid.frees(), 0);
}

#[test]
fn test_wide_send_sequence_is_truncated() {
    let lucid = FixtureLucid::new();
    let snapshot = PortableSnapshot::new(&lucid);
    let mut ctx = sample_context();
    ctx.send_seq = u64::from(u32::MAX) + 43;

    let record = export_context(&snapshot, &ctx).unwrap();
    let parsed = rfc1964::parse(record.as_bytes()).unwrap();
    assert_eq!(parsed.send_seq, 42);
}

proptest! {
    #[test]
    fn derived_key_is_masked_primary(key in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut ctx = sample_context();
        ctx.rfc1964_kd.ctx_key = KeyBlock::new(23, key.clone());

        let lucid = FixtureLucid::new();
        let snapshot = PortableSnapshot::new(&lucid);
        let record = export_context(&snapshot, &ctx).unwrap();
        prop_assert_eq!(
            record.len(),
            FIXED_FIELDS_LEN + 4 + KRB5_MECH_OID.len() + 2 * (4 + 4 + key.len())
        );

        let parsed = rfc1964::parse(record.as_bytes()).unwrap();
        prop_assert_eq!(parsed.derived_key.enctype, 23);
        prop_assert_eq!(parsed.derived_key.data.len(), key.len());
        for (derived, primary) in parsed.derived_key.data.iter().zip(&key) {
            prop_assert_eq!(*derived, primary ^ DERIVED_KEY_MASK);
        }
        prop_assert_eq!(parsed.ctx_key.data, key);
    }
}
