//! State is organized as three independently keyed JSON documents owned by
//! [completion::CompletionStore]:
//!  - `workouts`: the list of trackable workouts.
//!  - `daily_completion`: the live completed set for the current local date.
//!  - `activity_history`: per-day completion counts for the trailing 90 days, pruned on write.

pub mod completion;
pub mod entities;
pub mod key_value;
pub mod refresh;
