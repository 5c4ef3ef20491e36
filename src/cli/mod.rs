//! Command-line interface definitions for the `flexcheck` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Top-level CLI for the `flexcheck` binary.
#[derive(Debug, Parser)]
#[command(
    name = "flexcheck",
    about = "Verify the worker instance of a deployed Dataflow flex template job",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Find the job's worker instance and optionally check its service account.
    #[command(
        name = "verify",
        about = "Find the job's worker instance and check its service account"
    )]
    Verify(VerifyCommand),
    /// Print randomised resource names for an acceptance run.
    #[command(name = "names", about = "Print randomised resource names for an acceptance run")]
    Names(NamesCommand),
}

/// Arguments for the `flexcheck verify` subcommand.
#[derive(Debug, Args)]
pub(crate) struct VerifyCommand {
    #[command(flatten)]
    pub(crate) job: JobSource,
    /// Terraform resource address of the job inside --state
    /// [default: google_dataflow_flex_template_job.big_data].
    #[arg(long, value_name = "ADDR", requires = "state")]
    pub(crate) resource: Option<String>,
    /// Zone whose instances are listed; overrides GOOGLE_ZONE.
    #[arg(long, value_name = "ZONE")]
    pub(crate) zone: Option<String>,
    /// Expected service account id (the email before `@`).
    #[arg(long, value_name = "ID")]
    pub(crate) expect_account: Option<String>,
}

/// Where the job id comes from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct JobSource {
    /// Dataflow job id.
    #[arg(long, value_name = "ID")]
    pub(crate) job_id: Option<String>,
    /// Terraform state file holding the job resource.
    #[arg(long, value_name = "FILE")]
    pub(crate) state: Option<PathBuf>,
}

/// Arguments for the `flexcheck names` subcommand.
#[derive(Debug, Args)]
pub(crate) struct NamesCommand {
    /// Use a fixed suffix instead of a random one.
    #[arg(long, value_name = "SUFFIX")]
    pub(crate) suffix: Option<String>,
}
