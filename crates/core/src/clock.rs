use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "today" for every date rule.
///
/// Dates are compared at day granularity in the store's timezone, so the clock
/// carries that zone rather than reading the host's local time.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    Zoned(Tz),
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Zoned(tz) => Utc::now().with_timezone(tz).date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Zoned(chrono_tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(Clock::Fixed(date).today(), date);
    }

    #[test]
    fn zoned_clock_is_within_a_day_of_utc() {
        let utc_today = Utc::now().date_naive();
        let tokyo = Clock::Zoned(chrono_tz::Asia::Tokyo).today();
        let delta = (tokyo - utc_today).num_days();
        assert!((0..=1).contains(&delta));
    }
}
