pub mod init;
pub mod update;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use init::process_init_command;
use tracing::level_filters::LevelFilter;
use update::{process_update_command, UpdateCommand};

use crate::{
    config::EnvSource,
    utils::{clock::DefaultClock, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "ghtracker", version, long_about = None)]
#[command(about = "Keeps a daily GitHub contribution tracker workbook up to date", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable verbose logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Also write logs into daily rotated files in this directory"
    )]
    log_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "File with KEY=value settings. Defaults to .env in the current directory"
    )]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Create the tracker workbook with headers and a Config sheet")]
    Init {
        #[arg(long, help = "Overwrite the workbook if it already exists")]
        force: bool,
    },
    #[command(about = "Fetch GitHub activity for a day and write it into the workbook")]
    Update {
        #[command(flatten)]
        command: UpdateCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(args.log_dir.as_deref(), logging_level, args.log)?;

    let source = EnvSource::with_dotenv(args.env_file.as_deref());

    match args.commands {
        Commands::Init { force } => process_init_command(&source, force),
        Commands::Update { command } => {
            process_update_command(command, &source, &DefaultClock).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Commands};

    #[test]
    fn test_update_takes_optional_date() {
        let args = Args::try_parse_from(["ghtracker", "update", "13/01/2026"]).unwrap();
        match args.commands {
            Commands::Update { command } => assert_eq!(command.date.as_deref(), Some("13/01/2026")),
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from(["ghtracker", "update"]).unwrap();
        assert!(matches!(args.commands, Commands::Update { command } if command.date.is_none()));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["ghtracker", "init", "--force", "--log", "--env-file", "x.env"])
                .unwrap();
        assert!(args.log);
        assert_eq!(args.env_file.unwrap().to_str(), Some("x.env"));
        assert!(matches!(args.commands, Commands::Init { force: true }));
    }

    #[test]
    fn test_update_rejects_extra_arguments() {
        assert!(Args::try_parse_from(["ghtracker", "update", "2026-01-13", "2026-01-14"]).is_err());
    }
}
