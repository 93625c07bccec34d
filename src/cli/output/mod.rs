pub mod month_grid;

use ansi_term::{Colour, Style};

use month_grid::DaySlot;

/// Five step green scale bucketed by workouts completed, darkest for 4 and above.
const COUNT_SCALE: [Colour; 5] = [
    Colour::RGB(0xeb, 0xed, 0xf0),
    Colour::RGB(0x9b, 0xe9, 0xa8),
    Colour::RGB(0x40, 0xc4, 0x63),
    Colour::RGB(0x30, 0xa1, 0x4e),
    Colour::RGB(0x21, 0x6e, 0x39),
];

fn count_colour(count: u32) -> Colour {
    COUNT_SCALE[count.min(COUNT_SCALE.len() as u32 - 1) as usize]
}

/// Paints one grid slot as a two character cell. Pads and missing slots render blank.
pub fn paint_slot(slot: Option<&DaySlot>) -> String {
    match slot {
        Some(DaySlot::Day { count, .. }) => Style::new()
            .on(count_colour(*count))
            .paint("  ")
            .to_string(),
        Some(DaySlot::Empty) | None => "  ".to_string(),
    }
}

pub fn legend() -> String {
    let squares = COUNT_SCALE
        .iter()
        .map(|colour| Style::new().on(*colour).paint("  ").to_string())
        .collect::<String>();
    format!("Less {squares} More")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{count_colour, paint_slot, COUNT_SCALE};
    use crate::cli::output::month_grid::DaySlot;

    #[test]
    fn counts_above_the_scale_saturate() {
        assert_eq!(count_colour(4), COUNT_SCALE[4]);
        assert_eq!(count_colour(17), COUNT_SCALE[4]);
    }

    #[test]
    fn pads_render_blank() {
        assert_eq!(paint_slot(Some(&DaySlot::Empty)), "  ");
        assert_eq!(paint_slot(None), "  ");
        assert!(paint_slot(Some(&DaySlot::Day {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            count: 0,
        }))
        .contains('\u{1b}'));
    }
}
