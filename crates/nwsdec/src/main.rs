use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};

use nwstext::{MessageOptions, ProductParserBuilder};

mod app;
mod cli;
mod providers;

use cli::{Args, CliError};

fn main() {
    match nwsdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn nwsdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the decoder
    let mut builder = ProductParserBuilder::new();
    if let Some(now) = args.utcnow {
        builder.with_utcnow(now);
    }
    if let Some(path) = &args.ugc_db {
        builder.with_ugc_provider(Arc::new(providers::load_ugc_db(path)?));
    }
    if let Some(path) = &args.nwsli_db {
        builder.with_nwsli_provider(Arc::new(providers::load_nwsli_db(path)?));
    }
    let parser = builder.build();

    let mut msg_opts = MessageOptions::new();
    if let Some(url) = &args.vtec_url {
        msg_opts.with_vtec_url(url.as_str());
    }

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let input = file_setup(&args, stdin_handle)?;

    let failures = app::run(&args, &parser, &msg_opts, &input, &mut io::stdout().lock())
        .context("unable to write output")?;
    if failures > 0 {
        return Err(CliError::new(
            anyhow!("{} product(s) could not be decoded", failures),
            1,
        ));
    }

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("nwstext", log_filter)
            .filter_module("nwsdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup(args: &Args, mut stdin: io::StdinLock<'_>) -> Result<String, anyhow::Error> {
    let mut buf = Vec::new();
    if args.input_is_stdin() {
        info!("NWS decoder reading standard input");
        if is_terminal(&std::io::stdin()) {
            info!("type or paste a product, then end input with Ctrl+D");
        }
        stdin
            .read_to_end(&mut buf)
            .context("Unable to read standard input")?;
    } else {
        info!("NWS decoder reading file: \"{}\"", &args.file);
        std::fs::File::open(&args.file)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .with_context(|| format!("Unable to read --file \"{}\"", args.file))?;
    }

    // products are nominally ASCII, but archives are not always clean
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
