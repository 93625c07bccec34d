use std::{collections::HashMap, fmt::Display};

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;

use crate::{
    store::{completion::CompletionStore, key_value::KeyValueStore},
    utils::time::{format_date, next_day_start},
};

use super::{
    output::{
        legend,
        month_grid::{month_grids, DaySlot},
        paint_slot,
    },
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Rows of the grid, Monday first; only every other weekday is labeled.
const DAY_LABELS: [&str; 7] = ["Mon", "", "Wed", "", "Fri", "", ""];

/// Command to render the trailing 6 month activity heatmap. Weeks are columns, weekdays are
/// rows, months print one block after another.
pub fn process_grid_command(store: &CompletionStore<impl KeyValueStore>) {
    let grids = month_grids(store.activity_history(), store.today(), store.today_count());

    println!("Activity - Last 6 Months");
    println!();
    for month in &grids {
        println!("{}", month.label);
        for row in 0..7 {
            let cells = month
                .weeks
                .iter()
                .map(|week| paint_slot(week.get(row)))
                .collect::<String>();
            println!("{:>3} {cells}", DAY_LABELS[row]);
        }
        println!();
    }

    println!("{}", legend());
    println!("Today: {} workouts", store.today_count());
}

/// History defaults to the retention window when no range is given.
const DEFAULT_HISTORY_DAYS: i64 = 90;

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"yesterday\", \"90 days ago\", \"15/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of the range. Examples are \"yesterday\", \"15/03/2025\""
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to print per day completion counts over a date range. Days after today never show
/// up, and today itself reports the live count.
pub fn process_history_command(
    store: &CompletionStore<impl KeyValueStore>,
    HistoryCommand {
        start_date,
        end_date,
        date_style,
    }: HistoryCommand,
) -> Result<()> {
    let now = Local::now();
    let dialect: chrono_english::Dialect = date_style.into();
    let start = match start_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate start date {e}"),
                )
                .into());
        }
        None => now - Duration::days(DEFAULT_HISTORY_DAYS),
    };
    let end = match end_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate end date {e}"),
                )
                .into());
        }
        None => now,
    };

    // Counts are day granular, so the range widens to whole days.
    let mut day = start.beginning_of_day();
    let end = next_day_start(end);

    let today = store.today();
    let counts: HashMap<NaiveDate, u32> = store
        .activity_history()
        .iter()
        .map(|entry| (entry.date, entry.count))
        .collect();

    while day < end {
        let date = day.date_naive();
        if date > today {
            break;
        }
        let count = if date == today {
            store.today_count()
        } else {
            counts.get(&date).copied().unwrap_or(0)
        };
        println!(
            "{} {}\t{count}",
            format_date(date),
            paint_slot(Some(&DaySlot::Day { date, count }))
        );
        day = next_day_start(day);
    }
    Ok(())
}
