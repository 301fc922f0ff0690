// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Record encoding for stdout and files.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use base64::Engine;

use crate::config::OutputFormat;

/// Encode `record` for output. Text formats end with a newline.
pub fn render(record: &[u8], format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Raw => record.to_vec(),
        OutputFormat::Hex => format!("{}\n", hex::encode(record)).into_bytes(),
        OutputFormat::Base64 => format!(
            "{}\n",
            base64::engine::general_purpose::STANDARD.encode(record)
        )
        .into_bytes(),
    }
}

/// Inverse of [`render`]. Surrounding whitespace is ignored for text formats.
pub fn decode(input: &[u8], format: OutputFormat) -> anyhow::Result<Vec<u8>> {
    match format {
        OutputFormat::Raw => Ok(input.to_vec()),
        OutputFormat::Hex => {
            let text = std::str::from_utf8(input).context("hex record is not UTF-8")?;
            Ok(hex::decode(text.trim())?)
        }
        OutputFormat::Base64 => {
            let text = std::str::from_utf8(input).context("base64 record is not UTF-8")?;
            Ok(base64::engine::general_purpose::STANDARD.decode(text.trim())?)
        }
    }
}

/// Write an encoded record to `path`, or to stdout when `path` is `None`.
pub fn emit(encoded: &[u8], path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, encoded).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(encoded)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
