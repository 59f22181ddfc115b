mod cli;
mod commands;
mod config;
mod host;
mod provider;
mod resources;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::ProviderConfig;
use lifecycle::Operation;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let config = || -> Result<ProviderConfig> {
        Ok(ProviderConfig::load(cli.config.as_deref())?
            .with_overrides(cli.token.clone(), cli.url.clone()))
    };

    match cli.command {
        Command::Resources => commands::resources::list(&ctx),
        Command::Schema { ref kind } => commands::resources::schema(kind),
        Command::Create(ref args) => commands::lifecycle::run(
            &ctx,
            &config()?,
            Operation::Create,
            &args.kind,
            Some(&args.plan),
            &args.state,
        ),
        Command::Read(ref args) => commands::lifecycle::run(
            &ctx,
            &config()?,
            Operation::Read,
            &args.kind,
            None,
            &args.state,
        ),
        Command::Update(ref args) => commands::lifecycle::run(
            &ctx,
            &config()?,
            Operation::Update,
            &args.kind,
            Some(&args.plan),
            &args.state,
        ),
        Command::Delete(ref args) => commands::lifecycle::run(
            &ctx,
            &config()?,
            Operation::Delete,
            &args.kind,
            None,
            &args.state,
        ),
        Command::Import {
            ref kind,
            ref id,
            ref state,
        } => commands::lifecycle::import(&ctx, kind, id, state),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ablyform", &mut io::stdout());
            Ok(())
        }
    }
}
