use std::process::ExitCode;

use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cli::Cli,
    config::{Config, FileConfig},
    fetch::Remote,
    pipeline::Pipeline,
};

mod citekey;
mod cli;
mod config;
mod error;
mod fetch;
mod identifier;
mod normalize;
mod pipeline;
mod record;
mod store;

fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let file = FileConfig::load(args.config.as_deref())?;
    let config = Config::resolve(file, args.library.clone(), args.parse_text)?;
    tracing::debug!(?config, "configuration resolved");
    let fetcher = Remote::new(&config);
    let pipeline = Pipeline::new(config, fetcher);

    // stdout carries only the result for the caller: the citekey, or the reason there is none.
    match pipeline.run(&args.input()) {
        Ok(key) => {
            println!("{key}");
            eprintln!(
                "{} {key} → {}",
                "✓".if_supports_color(Stream::Stderr, |t| t.green()),
                pipeline.store().path().display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{err}");
            eprintln!(
                "{} {err}",
                "✗".if_supports_color(Stream::Stderr, |t| t.red())
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("bibadd={level}"))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
