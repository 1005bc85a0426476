use std::fmt::Display;

use chrono::{DateTime, Utc};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program reads NWS text products from a file or standard input and decodes them. Several products may be concatenated if each begins with the SOH (0x01) character.

See --help for more details.
"#;

const USAGE_LONG: &str = r##"
This program reads NWS text products from a file or standard input and decodes them. Several products may be concatenated if each begins with the SOH (0x01) character.

Decode an archived product, with times relative to its issuance:

    nwsdec --file TORJAN.txt --utcnow 2005-08-29T17:00:00Z

Print chat-style messages, with county names:

    nwsdec --format messages --ugc-db ugcs.txt < TORJAN.txt

The --ugc-db file has one UGC per line, in the form

    IAC001|Adair|DMX

with multiple offices separated by commas. The --nwsli-db file
has one location per line:

    KEOI4|Des Moines River at Keosauqua|40.73|-91.96|DVN

Lines beginning with "#" are ignored.

With --lifecycle, all products are applied in order to an
in-memory event store, and any inconsistencies are reported.

The exit status is 1 if any product cannot be decoded.
"##;

/// Output formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per product
    Json,

    /// Short human-readable summary
    Summary,

    /// Assembled plain-text messages
    Messages,
}

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING but errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    pub format: Format,

    /// Reference time for products without an MND line (RFC 3339)
    ///
    /// Products which only carry a WMO day-of-month timestamp are
    /// placed on the calendar nearest to this time. Defaults to
    /// the system clock.
    #[arg(long, value_parser = parse_utcnow)]
    pub utcnow: Option<DateTime<Utc>>,

    /// UGC names and offices, pipe-delimited
    #[arg(long)]
    pub ugc_db: Option<String>,

    /// NWSLI names and locations, pipe-delimited
    #[arg(long)]
    pub nwsli_db: Option<String>,

    /// Track event lifecycles across all input products
    #[arg(long)]
    pub lifecycle: bool,

    /// Link prefix for VTEC events in messages
    #[arg(long)]
    pub vtec_url: Option<String>,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

fn parse_utcnow(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 time like 2005-08-29T17:00:00Z: {}", e))
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn test_clap() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "nwsdec",
            "--format",
            "messages",
            "--utcnow",
            "2005-08-29T17:00:00Z",
            "--lifecycle",
        ])
        .unwrap();
        assert_eq!(args.format, Format::Messages);
        assert_eq!(
            args.utcnow,
            Some(Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap())
        );
        assert!(args.lifecycle);
        assert!(args.input_is_stdin());

        assert!(Args::try_parse_from(["nwsdec", "--utcnow", "yesterday"]).is_err());
    }
}
