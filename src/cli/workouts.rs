use anyhow::Result;
use chrono::Local;
use clap::{ArgGroup, CommandFactory, Parser};

use crate::{
    store::{completion::CompletionStore, entities::WorkoutImage, key_value::KeyValueStore},
    utils::time::format_date,
};

use super::Args;

#[derive(Debug, Parser)]
#[command(group = ArgGroup::new("image_source").required(true))]
pub struct AddCommand {
    #[arg(help = "Display name of the workout")]
    name: String,
    #[arg(
        long,
        group = "image_source",
        help = "Symbolic icon name, for example barbell, bicycle or walk"
    )]
    icon: Option<String>,
    #[arg(
        long,
        group = "image_source",
        help = "Uri or path of a custom image to show instead of an icon"
    )]
    image: Option<String>,
}

pub async fn process_add_command(
    store: &mut CompletionStore<impl KeyValueStore>,
    command: AddCommand,
) -> Result<()> {
    let image = match (command.icon, command.image) {
        (Some(icon), None) => WorkoutImage::Icon(icon),
        (None, Some(uri)) => WorkoutImage::Image(uri),
        _ => unreachable!("clap enforces exactly one image source"),
    };

    if let Err(e) = store.add_workout(&command.name, image).await {
        return Err(Args::command()
            .error(clap::error::ErrorKind::ValueValidation, e.to_string())
            .into());
    }

    println!("Added {}", command.name.trim());
    Ok(())
}

#[derive(Debug, Parser)]
pub struct DoneCommand {
    #[arg(help = "Workout name or id")]
    workout: String,
}

pub async fn process_done_command(
    store: &mut CompletionStore<impl KeyValueStore>,
    command: DoneCommand,
) -> Result<()> {
    let id = resolve_workout(store, &command.workout)?;
    store.toggle_completion(&id).await;

    if store.is_completed(&id) {
        println!(
            "Done: {} ({} completed today)",
            command.workout,
            store.today_count()
        );
    } else {
        println!(
            "Unmarked: {} ({} completed today)",
            command.workout,
            store.today_count()
        );
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct RemoveCommand {
    #[arg(help = "Workout name or id")]
    workout: String,
}

pub async fn process_remove_command(
    store: &mut CompletionStore<impl KeyValueStore>,
    command: RemoveCommand,
) -> Result<()> {
    let id = resolve_workout(store, &command.workout)?;
    store.delete_workout(&id).await;
    println!("Removed {}", command.workout);
    Ok(())
}

pub fn print_workouts(store: &CompletionStore<impl KeyValueStore>) {
    if store.workouts().is_empty() {
        println!("No workouts yet. Add one with: repgrid add <name> --icon <icon>");
        return;
    }

    for workout in store.workouts() {
        let mark = if store.is_completed(&workout.id) { "x" } else { " " };
        println!(
            "[{mark}] {}\t{}\t(since {})",
            workout.name,
            workout.image_uri,
            format_date(workout.created_at.with_timezone(&Local).date_naive())
        );
    }
    println!();
    println!(
        "Today: {}/{} completed",
        store.today_count(),
        store.workouts().len()
    );
}

/// Resolves a user supplied selector to a workout id, preferring an exact name match over an id
/// match. The store itself accepts unknown ids, but the cli has no reason to pass one through.
fn resolve_workout(store: &CompletionStore<impl KeyValueStore>, selector: &str) -> Result<String> {
    store
        .workouts()
        .iter()
        .find(|workout| workout.name == selector)
        .or_else(|| store.workouts().iter().find(|workout| workout.id == selector))
        .map(|workout| workout.id.clone())
        .ok_or_else(|| {
            Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("No workout named {selector}"),
                )
                .into()
        })
}
