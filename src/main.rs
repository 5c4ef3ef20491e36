//! Binary entry point for the flexcheck CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use clap::Parser;
use thiserror::Error;

use flexcheck::{
    ComputeInstance, GoogleConfig, InstanceLister, JobId, JobInstanceVerifier, StateError,
    TestRunNames, VerifyError, job_id_from_state_file, logging,
};

mod cli;

const DEFAULT_RESOURCE: &str = "google_dataflow_flex_template_job.big_data";

use cli::{Cli, JobSource, NamesCommand, VerifyCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("state lookup failed: {0}")]
    State(#[from] StateError),
    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Verify(command) => run_verify(command).await,
        Cli::Names(command) => run_names(&command, io::stdout()),
    }
}

async fn run_verify(args: VerifyCommand) -> Result<(), CliError> {
    let config =
        GoogleConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    logging::init(config.log_level());

    let job_id = resolve_job_id(&args.job, args.resource.as_deref())?;
    let zone = args.zone.unwrap_or_else(|| config.zone.clone());
    let verifier =
        JobInstanceVerifier::from_config(&config).map_err(|err| CliError::Config(err.to_string()))?;

    let instance = execute_verify(&verifier, &job_id, &zone, args.expect_account.as_deref()).await?;
    write_summary(io::stdout(), &job_id, &instance)
}

fn resolve_job_id(source: &JobSource, resource: Option<&str>) -> Result<JobId, CliError> {
    let raw = match (&source.job_id, &source.state) {
        (Some(job_id), _) => job_id.clone(),
        (None, Some(path)) => {
            let state_path = Utf8Path::from_path(path).ok_or_else(|| {
                CliError::Config(format!("state path is not UTF-8: {}", path.display()))
            })?;
            job_id_from_state_file(state_path, resource.unwrap_or(DEFAULT_RESOURCE))?
        }
        (None, None) => {
            return Err(CliError::Config(String::from(
                "either --job-id or --state is required",
            )));
        }
    };
    Ok(JobId::new(raw)?)
}

async fn execute_verify<L: InstanceLister>(
    verifier: &JobInstanceVerifier<L>,
    job_id: &JobId,
    zone: &str,
    expected_account: Option<&str>,
) -> Result<ComputeInstance, CliError> {
    let instance = match expected_account {
        Some(expected) => {
            verifier
                .check_job_service_account(job_id, zone, expected)
                .await?
        }
        None => verifier.find_instance_for_job(job_id, zone).await?,
    };
    Ok(instance)
}

fn write_summary(
    mut target: impl Write,
    job_id: &JobId,
    instance: &ComputeInstance,
) -> Result<(), CliError> {
    let accounts = instance
        .service_accounts
        .iter()
        .map(|account| account.email.as_str())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(
        target,
        "job_id={job_id} instance={} service_accounts={accounts}",
        instance.name
    )
    .map_err(|err| CliError::Output(err.to_string()))
}

fn run_names(args: &NamesCommand, mut target: impl Write) -> Result<(), CliError> {
    let names = args
        .suffix
        .as_deref()
        .map_or_else(TestRunNames::generate, TestRunNames::with_suffix);
    target
        .write_all(names.to_env_lines().as_bytes())
        .map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
