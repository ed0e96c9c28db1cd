use chrono::{DateTime, NaiveDate, Utc};

/// Represents an entity responsible for providing dates across application. This allows tests to
/// pin "today" and the "last updated" stamp.
pub trait Clock {
    fn time(&self) -> DateTime<Utc>;

    /// Current calendar day in UTC. Used when no date is passed to `update`.
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single moment.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.0
    }
}
