pub mod activity;
pub mod output;
pub mod workouts;

use std::path::PathBuf;

use activity::{process_grid_command, process_history_command, HistoryCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use workouts::{
    print_workouts, process_add_command, process_done_command, process_remove_command, AddCommand,
    DoneCommand, RemoveCommand,
};

use crate::{
    store::{completion::CompletionStore, key_value::JsonKeyValueStore, refresh::LogRefresh},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Repgrid", version, long_about = None)]
#[command(about = "Track daily workouts from your terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a new workout to track")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Toggle a workout's completion for today")]
    Done {
        #[command(flatten)]
        command: DoneCommand,
    },
    #[command(about = "Delete a workout")]
    Remove {
        #[command(flatten)]
        command: RemoveCommand,
    },
    #[command(about = "List workouts with today's completion marks")]
    List {},
    #[command(about = "Display the activity grid for the last 6 months")]
    Grid {},
    #[command(about = "Display per day completion counts for a date range")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = match args.dir.clone() {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let storage = JsonKeyValueStore::new(app_dir.join("store"))?;
    let mut store = CompletionStore::new(storage, Box::new(DefaultClock), Box::new(LogRefresh));
    // Every invocation counts as a focus event: a rollover that happened since the last run is
    // detected here, before any command executes.
    store.load().await;

    match args.commands {
        Commands::Add { command } => process_add_command(&mut store, command).await,
        Commands::Done { command } => process_done_command(&mut store, command).await,
        Commands::Remove { command } => process_remove_command(&mut store, command).await,
        Commands::List {} => {
            print_workouts(&store);
            Ok(())
        }
        Commands::Grid {} => {
            process_grid_command(&store);
            Ok(())
        }
        Commands::History { command } => process_history_command(&store, command),
    }
}
