//! Track daily workout habits and browse completion history as a 6 month activity grid,
//! straight from a terminal. State lives in a small local JSON store; there is no server and no
//! account, just the streak.
//!

pub mod cli;
pub mod store;
pub mod utils;
