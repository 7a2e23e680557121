//! pfcut - cut and restore outbound traffic to a fixed set of TCP ports via pf.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pfcut::cli::{Cli, Commands};
use pfcut::cmd_abstraction::RealCommandExecutor;
use pfcut::commands;
use pfcut::config::Config;
use pfcut::dispatch::{Action, Dispatcher, Invocation};
use pfcut::error::exit_code_for;
use pfcut::fs_abstraction::real_fs;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("err: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(command) = cli.command.clone() else {
        // No action: usage only, not an error
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    match run(&cli, &command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("err: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(cli: &Cli, command: &Commands) -> Result<()> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(ref pf_conf) = cli.pf_conf {
        config.pf_conf = pf_conf.clone();
    }

    let exec = RealCommandExecutor::new();
    let mut invocation = Invocation::new(config, &exec, real_fs());
    if let Commands::Enable { seconds: Some(secs) } = command {
        invocation.restore_after = Some(Duration::from_secs(*secs));
    }

    let mut dispatcher = Dispatcher::new()
        .register(Action::Disable, commands::disable::run)
        .register(Action::Enable, commands::enable::run)
        .register(Action::Backup, commands::backup::run)
        .register(Action::Status, commands::status::run);

    if cli.debug {
        dispatcher = dispatcher
            .register_pre_run(commands::debug::run)
            .register_post_run(commands::debug::run);
    }

    dispatcher.handle(command.action(), &invocation)
}
