use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing.
///
/// Day boundaries in this domain are local wall-clock midnights, so the clock hands out local
/// time.
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Local>;

    /// The current local calendar date. Everything date-keyed in the store compares against this.
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}
