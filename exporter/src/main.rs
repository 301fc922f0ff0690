// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kctx-export: Kerberos GSS context upcall records, offline
//
// Replays a captured lucid context through the same export path gssd uses
// and writes the record the kernel would receive, or decodes an existing
// record. Diagnostics go to stderr; only the record goes to stdout.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kctx_exporter::config::{ExporterConfig, LogFormat, OutputFormat};
use kctx_exporter::{output, replay};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kctx-export", about = "Kerberos GSS context export for the kernel upcall")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log line format (overrides KCTX_LOG_FORMAT)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Command {
    /// Serialize a captured lucid context (JSON) into an upcall record
    Export {
        /// Captured context
        context: PathBuf,

        /// Record encoding (overrides KCTX_OUTPUT_FORMAT)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the record here instead of stdout (overrides KCTX_OUTPUT)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decode an RFC 1964 upcall record
    Inspect {
        /// Record file
        record: PathBuf,

        /// Encoding of the record file (overrides KCTX_OUTPUT_FORMAT)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut config = ExporterConfig::from_env();
    if let Some(log_format) = args.log_format {
        config.log_format = log_format;
    }
    init_tracing(config.log_format);

    match run(args.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "kctx-export failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(command: Command, mut config: ExporterConfig) -> anyhow::Result<()> {
    match command {
        Command::Export {
            context,
            format,
            output,
        } => {
            if let Some(format) = format {
                config.output_format = format;
            }
            if output.is_some() {
                config.output_path = output;
            }
            export(&context, &config)
        }
        Command::Inspect { record, format } => {
            if let Some(format) = format {
                config.output_format = format;
            }
            inspect(&record, &config)
        }
    }
}

fn export(context: &std::path::Path, config: &ExporterConfig) -> anyhow::Result<()> {
    let ctx = replay::load_context(context)?;
    let record = replay::replay(&ctx)?;
    info!(
        context = %context.display(),
        len = record.len(),
        format = ?config.output_format,
        "serialized krb5 context"
    );

    let encoded = output::render(record.as_bytes(), config.output_format);
    output::emit(&encoded, config.output_path.as_deref())
}

fn inspect(path: &std::path::Path, config: &ExporterConfig) -> anyhow::Result<()> {
    let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    print!("{}", replay::inspect(&raw, config.output_format)?);
    Ok(())
}
