use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::store::entities::ActivityDay;

/// Number of trailing calendar months covered by the activity grid.
const GRID_MONTHS: u32 = 6;

/// One rendered month: a label like `Mar 2024` plus its weeks, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub label: String,
    pub weeks: Vec<Week>,
}

/// Up to seven slots, Monday first. The first week of a month is left-padded with
/// [DaySlot::Empty]; a trailing partial week is kept as is.
pub type Week = Vec<DaySlot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySlot {
    /// Padding before the first day of the month.
    Empty,
    Day { date: NaiveDate, count: u32 },
}

/// Builds the trailing six month activity grid, oldest month first.
///
/// Days after `today` are never emitted, and `today` itself always shows `today_count`, which
/// overrides whatever history carries for it. Every other day shows its history count or 0.
/// Pure: identical inputs produce an identical grid.
pub fn month_grids(history: &[ActivityDay], today: NaiveDate, today_count: u32) -> Vec<MonthGrid> {
    let counts: HashMap<NaiveDate, u32> =
        history.iter().map(|day| (day.date, day.count)).collect();

    let first_of_current = today.with_day(1).expect("day 1 exists in every month");

    (0..GRID_MONTHS)
        .rev()
        .map(|offset| month_grid(first_of_current - Months::new(offset), today, today_count, &counts))
        .collect()
}

fn month_grid(
    first: NaiveDate,
    today: NaiveDate,
    today_count: u32,
    counts: &HashMap<NaiveDate, u32>,
) -> MonthGrid {
    let mut weeks: Vec<Week> = vec![];
    // Monday opens the week, so a month starting on Sunday pads a full six slots.
    let mut current_week: Week =
        vec![DaySlot::Empty; first.weekday().num_days_from_monday() as usize];

    let mut date = first;
    while date.month() == first.month() && date <= today {
        let count = if date == today {
            today_count
        } else {
            counts.get(&date).copied().unwrap_or(0)
        };
        current_week.push(DaySlot::Day { date, count });

        if current_week.len() == 7 {
            weeks.push(current_week);
            current_week = vec![];
        }

        let Some(next) = date.succ_opt() else { break };
        date = next;
    }

    if !current_week.is_empty() {
        weeks.push(current_week);
    }

    MonthGrid {
        label: first.format("%b %Y").to_string(),
        weeks,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::store::entities::ActivityDay;

    use super::{month_grids, DaySlot, MonthGrid};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn slot_for(grid: &MonthGrid, wanted: NaiveDate) -> Option<DaySlot> {
        grid.weeks.iter().flatten().copied().find(
            |slot| matches!(slot, DaySlot::Day { date, .. } if *date == wanted),
        )
    }

    #[test]
    fn six_trailing_months_oldest_first() {
        let grids = month_grids(&[], date(2024, 3, 15), 0);

        let labels: Vec<_> = grids.iter().map(|month| month.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Oct 2023", "Nov 2023", "Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"]
        );
    }

    #[test]
    fn live_count_overrides_history_and_future_days_are_absent() {
        let history = vec![
            ActivityDay {
                date: date(2024, 3, 14),
                count: 1,
            },
            // Stale entry for today; the live value must win.
            ActivityDay {
                date: date(2024, 3, 15),
                count: 0,
            },
        ];

        let grids = month_grids(&history, date(2024, 3, 15), 2);
        let march = grids.last().unwrap();

        assert_eq!(
            slot_for(march, date(2024, 3, 15)),
            Some(DaySlot::Day {
                date: date(2024, 3, 15),
                count: 2
            })
        );
        assert_eq!(
            slot_for(march, date(2024, 3, 14)),
            Some(DaySlot::Day {
                date: date(2024, 3, 14),
                count: 1
            })
        );
        assert_eq!(slot_for(march, date(2024, 3, 16)), None);
    }

    #[test]
    fn first_week_is_left_padded_to_monday() {
        // March 2024 starts on a Friday: four leading pads.
        let grids = month_grids(&[], date(2024, 3, 15), 0);
        let march = grids.last().unwrap();
        let pads = march.weeks[0]
            .iter()
            .take_while(|slot| **slot == DaySlot::Empty)
            .count();
        assert_eq!(pads, 4);
        assert_eq!(march.weeks[0].len(), 7);

        // September 2024 starts on a Sunday: the full six pads.
        let grids = month_grids(&[], date(2024, 9, 30), 0);
        let september = grids.last().unwrap();
        let pads = september.weeks[0]
            .iter()
            .take_while(|slot| **slot == DaySlot::Empty)
            .count();
        assert_eq!(pads, 6);
    }

    #[test]
    fn current_month_ends_in_an_unpadded_partial_week() {
        let grids = month_grids(&[], date(2024, 3, 15), 0);
        let march = grids.last().unwrap();

        // Pads 4 + days 1..=15 is 19 slots: two full weeks and a 5 slot partial.
        assert_eq!(march.weeks.len(), 3);
        assert_eq!(march.weeks[2].len(), 5);
        assert_eq!(
            *march.weeks[2].last().unwrap(),
            DaySlot::Day {
                date: date(2024, 3, 15),
                count: 0
            }
        );
    }

    #[test]
    fn past_months_enumerate_every_day() {
        let grids = month_grids(&[], date(2024, 3, 15), 0);
        let february = &grids[4];
        assert_eq!(february.label, "Feb 2024");

        let days = february
            .weeks
            .iter()
            .flatten()
            .filter(|slot| matches!(slot, DaySlot::Day { .. }))
            .count();
        assert_eq!(days, 29);
    }

    #[test]
    fn days_without_history_show_zero() {
        let history = vec![ActivityDay {
            date: date(2024, 2, 10),
            count: 3,
        }];
        let grids = month_grids(&history, date(2024, 3, 15), 0);
        let february = &grids[4];

        assert_eq!(
            slot_for(february, date(2024, 2, 10)),
            Some(DaySlot::Day {
                date: date(2024, 2, 10),
                count: 3
            })
        );
        assert_eq!(
            slot_for(february, date(2024, 2, 11)),
            Some(DaySlot::Day {
                date: date(2024, 2, 11),
                count: 0
            })
        );
    }

    #[test]
    fn identical_inputs_produce_an_identical_grid() {
        let history = vec![
            ActivityDay {
                date: date(2024, 3, 1),
                count: 2,
            },
            ActivityDay {
                date: date(2024, 2, 29),
                count: 4,
            },
        ];

        let first = month_grids(&history, date(2024, 3, 15), 1);
        let second = month_grids(&history, date(2024, 3, 15), 1);
        assert_eq!(first, second);
    }
}
