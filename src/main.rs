use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_transcript::cli::{Cli, Invocation};
use yt_transcript::config::Config;
use yt_transcript::output::{self, Envelope};
use yt_transcript::{fetcher, resolver, TranscriptorError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::parse_invocation(std::env::args_os()) {
        Invocation::Run(cli) => cli,
        Invocation::Informational(err) => err.exit(),
        Invocation::Rejected(err) => return reject(&err),
    };

    init_tracing(cli.verbose, cli.log_json);

    let video_id = match resolver::resolve(&cli.input) {
        Some(id) => id,
        None => return reject(&TranscriptorError::UnresolvableUrl(cli.input.clone())),
    };

    tracing::info!("Fetching transcript for video ID: {}", video_id);

    let envelope = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.apply_cli(&cli);
            fetcher::run(&config, &video_id).await
        }
        Err(err) => fetcher::unexpected(err),
    };

    emit(&envelope);
    ExitCode::SUCCESS
}

/// Logs go to stderr; stdout carries only the JSON result
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "yt_transcript=debug,get_transcript=debug"
    } else {
        "yt_transcript=warn,get_transcript=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }
}

fn reject(err: &TranscriptorError) -> ExitCode {
    emit(&Envelope::from_error(err));
    ExitCode::from(err.exit_code())
}

fn emit(envelope: &Envelope) {
    if let Err(err) = output::print_to_console(envelope) {
        eprintln!("Failed to write result: {:#}", err);
    }
}
