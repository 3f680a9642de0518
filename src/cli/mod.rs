use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::TranscriptorError;

#[derive(Parser, Debug)]
#[command(
    name = "get-transcript",
    about = "Fetch the transcript of a YouTube video and print it as JSON",
    version,
    long_about = "Fetches the transcript of a YouTube video given a URL or a bare video ID. \
                  Preferred English transcripts are tried first; if none is available every \
                  listed transcript is probed in turn. The result is printed as a single JSON line."
)]
pub struct Cli {
    /// YouTube URL (youtube.com/watch, youtu.be, youtube.com/embed) or bare video ID
    #[arg(value_name = "VIDEO_ID_OR_URL", allow_hyphen_values = true)]
    pub input: String,

    /// Preferred transcript languages, in priority order (comma-separated)
    #[arg(
        short,
        long,
        value_name = "LANGS",
        value_delimiter = ',',
        env = "YT_TRANSCRIPT_LANGUAGES"
    )]
    pub languages: Option<Vec<String>>,

    /// Report the matched language code instead of "found" for preferred-language hits
    #[arg(long)]
    pub exact_language: bool,

    /// Keep basic HTML formatting tags (<i>, <b>, ...) in transcript text
    #[arg(long)]
    pub preserve_formatting: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "YT_TRANSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (written to stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Outcome of parsing the command line
#[derive(Debug)]
pub enum Invocation {
    Run(Cli),
    /// Help or version output that clap should print itself
    Informational(clap::Error),
    Rejected(TranscriptorError),
}

impl Cli {
    /// Parse arguments, turning every parse failure into a usage error
    pub fn parse_invocation<I, T>(args: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Invocation::Run(cli),
            Err(err)
                if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelp
                        | ClapErrorKind::DisplayVersion
                        | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) =>
            {
                Invocation::Informational(err)
            }
            Err(_) => Invocation::Rejected(TranscriptorError::usage()),
        }
    }
}
