// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strategy-independent view of an established krb5 GSS context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// DER body of the Kerberos v5 GSS mechanism OID 1.2.840.113554.1.2.2.
///
/// Fills the RFC1964 record's mechanism field when the extracted view does
/// not carry the mechanism itself (lucid contexts never do).
pub const KRB5_MECH_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x12, 0x01, 0x02, 0x02];

/// Length of the RFC1964 sequence-number seed.
pub const SEED_LEN: usize = 16;

/// Seed sent when the view has none. The kernel ignores seed and seed_init.
pub const ZERO_SEED: [u8; SEED_LEN] = [0; SEED_LEN];

/// Owned key material: enctype plus raw key bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBlock {
    pub enctype: u32,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl KeyBlock {
    pub fn new(enctype: u32, data: Vec<u8>) -> Self {
        Self { enctype, data }
    }

    pub fn as_block_ref(&self) -> KeyBlockRef<'_> {
        KeyBlockRef {
            enctype: self.enctype,
            data: &self.data,
        }
    }
}

// Key bytes never reach logs.
impl fmt::Debug for KeyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_block_ref(), f)
    }
}

/// Borrowed key material, as handed to the record builders.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyBlockRef<'a> {
    pub enctype: u32,
    pub data: &'a [u8],
}

impl fmt::Debug for KeyBlockRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBlock")
            .field("enctype", &self.enctype)
            .field("length", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// Wire format a context must be serialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVariant {
    /// RFC 1964 (DES, 3DES and RC4 enhancements). Protocol revision 0.
    Rfc1964,
    /// draft-ietf-krb-wg-gssapi-cfx. Any nonzero revision.
    Cfx { protocol: u32 },
}

impl WireVariant {
    pub fn from_protocol(protocol: u32) -> Self {
        match protocol {
            0 => WireVariant::Rfc1964,
            protocol => WireVariant::Cfx { protocol },
        }
    }
}

/// The fields the record builders consume, borrowed from an extracted view.
#[derive(Debug, Clone, Copy)]
pub struct ContextFields<'a> {
    pub initiate: bool,
    pub seed_init: bool,
    pub seed: [u8; SEED_LEN],
    pub sign_alg: u32,
    pub seal_alg: u32,
    pub endtime: u32,
    pub send_seq: u64,
    pub mech: &'a [u8],
    pub ctx_key: KeyBlockRef<'a>,
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_zero_is_rfc1964() {
        assert_eq!(WireVariant::from_protocol(0), WireVariant::Rfc1964);
        assert_eq!(
            WireVariant::from_protocol(1),
            WireVariant::Cfx { protocol: 1 }
        );
        assert_eq!(
            WireVariant::from_protocol(u32::MAX),
            WireVariant::Cfx { protocol: u32::MAX }
        );
    }

    #[test]
    fn key_debug_hides_material() {
        let key = KeyBlock::new(18, vec![0x5a; 32]);
        let shown = format!("{key:?}");
        assert!(shown.contains("enctype: 18"));
        assert!(shown.contains("length: 32"));
        assert!(!shown.contains("90"));
    }

    #[test]
    fn mech_oid_is_krb5() {
        assert_eq!(KRB5_MECH_OID.len(), 9);
        assert_eq!(KRB5_MECH_OID[0], 0x2a);
    }
}
