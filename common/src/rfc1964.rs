// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RFC 1964 upcall record.
//
// Layout (native byte order, no padding, order fixed by the kernel parser):
//   [4 bytes:  initiate (0/1)]
//   [4 bytes:  seed_init (0/1)]
//   [16 bytes: seed]
//   [4 bytes:  signalg]
//   [4 bytes:  sealalg]
//   [4 bytes:  endtime]
//   [4 bytes:  send sequence, low 32 bits]
//   [4 + N:    mechanism OID, opaque]
//   [4 + 4 + L: derived key block  (enctype, opaque key ^ 0xf0)]
//   [4 + 4 + L: context key block  (enctype, opaque key)]

use tracing::debug;

use crate::context::{ContextFields, KeyBlock, KeyBlockRef, SEED_LEN};
use crate::error::{ParseError, WriteError};
use crate::writer::{RecordWriter, SerializedRecord, MAX_CTX_LEN, OPAQUE_PREFIX_LEN};

/// XOR mask turning the context key into the derived key.
pub const DERIVED_KEY_MASK: u8 = 0xf0;

/// initiate, seed_init, seed, signalg, sealalg, endtime, send sequence.
pub const FIXED_FIELDS_LEN: usize = 4 + 4 + SEED_LEN + 4 + 4 + 4 + 4;

/// Derived key: same enctype and length, every byte masked with 0xf0.
pub fn derive_key(key: KeyBlockRef<'_>) -> KeyBlock {
    KeyBlock::new(
        key.enctype,
        key.data.iter().map(|b| b ^ DERIVED_KEY_MASK).collect(),
    )
}

/// Encoded size of one key block holding `key_len` bytes of key material.
pub fn keyblock_len(key_len: usize) -> usize {
    4 + OPAQUE_PREFIX_LEN + key_len
}

/// Size of the record [`build`] produces for `fields`, ignoring the capacity.
pub fn encoded_len(fields: &ContextFields<'_>) -> usize {
    FIXED_FIELDS_LEN
        + OPAQUE_PREFIX_LEN
        + fields.mech.len()
        + 2 * keyblock_len(fields.ctx_key.data.len())
}

/// Serialize `fields` as an RFC 1964 upcall record.
pub fn build(fields: &ContextFields<'_>) -> Result<SerializedRecord, WriteError> {
    let mut w = RecordWriter::new();

    w.append_fixed(u32::from(fields.initiate))?;
    w.append_fixed(u32::from(fields.seed_init))?;
    w.append_bytes(&fields.seed)?;
    w.append_fixed(fields.sign_alg)?;
    w.append_fixed(fields.seal_alg)?;
    w.append_fixed(fields.endtime)?;
    // The kernel keeps a 32-bit send sequence; the high half is dropped.
    w.append_fixed(fields.send_seq as u32)?;
    w.append_opaque(fields.mech)?;

    debug!(
        enctype = fields.ctx_key.enctype,
        length = fields.ctx_key.data.len(),
        "serializing keys"
    );

    let derived = derive_key(fields.ctx_key);
    write_keyblock(&mut w, derived.as_block_ref())?;
    write_keyblock(&mut w, fields.ctx_key)?;

    Ok(w.finish())
}

fn write_keyblock(w: &mut RecordWriter, key: KeyBlockRef<'_>) -> Result<(), WriteError> {
    w.append_fixed(key.enctype)?;
    w.append_opaque(key.data)
}

/// A decoded RFC 1964 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rfc1964Record {
    pub initiate: bool,
    pub seed_init: bool,
    pub seed: [u8; SEED_LEN],
    pub sign_alg: u32,
    pub seal_alg: u32,
    pub endtime: u32,
    pub send_seq: u32,
    pub mech: Vec<u8>,
    pub derived_key: KeyBlock,
    pub ctx_key: KeyBlock,
}

/// Decode a record produced by [`build`], the way the kernel reads it.
pub fn parse(bytes: &[u8]) -> Result<Rfc1964Record, ParseError> {
    if bytes.len() > MAX_CTX_LEN {
        return Err(ParseError::TooLong(bytes.len()));
    }
    let mut r = Reader { rest: bytes };

    let initiate = r.u32("initiate")? != 0;
    let seed_init = r.u32("seed_init")? != 0;
    let mut seed = [0u8; SEED_LEN];
    seed.copy_from_slice(r.take(SEED_LEN, "seed")?);
    let sign_alg = r.u32("signalg")?;
    let seal_alg = r.u32("sealalg")?;
    let endtime = r.u32("endtime")?;
    let send_seq = r.u32("send_seq")?;
    let mech = r.opaque("mech")?.to_vec();
    let derived_key = r.keyblock("derived key")?;
    let ctx_key = r.keyblock("context key")?;

    if !r.rest.is_empty() {
        return Err(ParseError::TrailingBytes(r.rest.len()));
    }

    Ok(Rfc1964Record {
        initiate,
        seed_init,
        seed,
        sign_alg,
        seal_alg,
        endtime,
        send_seq,
        mech,
        derived_key,
        ctx_key,
    })
}

struct Reader<'a> {
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], ParseError> {
        if self.rest.len() < n {
            return Err(ParseError::Truncated { field });
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, ParseError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4, field)?);
        Ok(u32::from_ne_bytes(raw))
    }

    fn opaque(&mut self, field: &'static str) -> Result<&'a [u8], ParseError> {
        let len = self.u32(field)? as usize;
        self.take(len, field)
    }

    fn keyblock(&mut self, field: &'static str) -> Result<KeyBlock, ParseError> {
        let enctype = self.u32(field)?;
        let data = self.opaque(field)?.to_vec();
        Ok(KeyBlock::new(enctype, data))
    }
}
