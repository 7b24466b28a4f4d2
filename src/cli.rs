use std::ffi::OsString;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser};

use crate::Result;
use crate::settings::SETTINGS_FILE;
use crate::switches::DateFormat;

/// Multi-letter short flags that clap cannot express, and the long flag each one means.
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-df", "--date-format"),
    ("-ds", "--date-start"),
    ("-de", "--date-end"),
    ("-fo", "--files-overwrite"),
];

#[derive(Parser, Debug)]
#[command(name = "slack-dm-archiver")]
#[command(about = "Archive a Slack direct message conversation to JSON, text and files")]
pub struct Cli {
    /// Slack authorisation token
    pub token: String,

    /// ID of the direct message chat
    pub dm: String,

    /// Date format to use (-df). Supported options: ISO8601, UK
    #[arg(long, value_parser = parse_date_format, default_value = "ISO8601")]
    pub date_format: DateFormat,

    /// Earliest messages to archive, inclusive (-ds)
    #[arg(long)]
    pub date_start: Option<String>,

    /// Latest messages to archive, exclusive (-de)
    #[arg(long)]
    pub date_end: Option<String>,

    /// Output directory to use for exports (excluding files)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "output")]
    pub output: Option<String>,

    /// Output the message history in raw json form
    #[arg(short, long, num_args = 0..=1, default_missing_value = "dm.json")]
    pub json: Option<String>,

    /// Output the message history in human readable form
    #[arg(short, long, num_args = 0..=1, default_missing_value = "dm.txt")]
    pub text: Option<String>,

    /// Download files sent in the conversation to this directory
    #[arg(short, long, num_args = 0..=1, default_missing_value = "output_files")]
    pub files: Option<String>,

    /// Overwrite files if they exist (-fo)
    #[arg(long)]
    pub files_overwrite: bool,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE)]
    pub settings: PathBuf,
}

impl Cli {
    /// Parse the process arguments, accepting the legacy `-df`/`-ds`/`-de`/`-fo` flags.
    pub fn parse_args() -> Self {
        Self::parse_from(expand_legacy_flags(std::env::args_os()))
    }

    /// Export directory; empty means the current directory.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output.as_deref().unwrap_or_default())
    }

    pub fn start_date(&self) -> Result<Option<NaiveDate>> {
        self.date_start
            .as_deref()
            .map(|s| self.date_format.parse_date(s))
            .transpose()
    }

    pub fn end_date(&self) -> Result<Option<NaiveDate>> {
        self.date_end
            .as_deref()
            .map(|s| self.date_format.parse_date(s))
            .transpose()
    }
}

fn parse_date_format(s: &str) -> std::result::Result<DateFormat, String> {
    s.parse::<DateFormat>().map_err(|e| e.to_string())
}

/// Rewrite legacy multi-letter short flags to their long form. Arguments after
/// `--`, and arguments that are not valid UTF-8, are left alone.
pub fn expand_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut seen_separator = false;
    args.into_iter()
        .map(|arg| -> OsString {
            let arg: OsString = arg.into();
            let arg = match arg.into_string() {
                Ok(arg) if !seen_separator => arg,
                Ok(arg) => return arg.into(),
                Err(raw) => return raw,
            };
            if arg == "--" {
                seen_separator = true;
                return arg.into();
            }
            for (short, long) in LEGACY_FLAGS {
                if arg == *short {
                    return long.into();
                }
                if let Some(value) = arg.strip_prefix(short).and_then(|r| r.strip_prefix('=')) {
                    return format!("{}={}", long, value).into();
                }
            }
            arg.into()
        })
        .collect()
}
