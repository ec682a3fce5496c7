use time::{Date, Duration};

use crate::error::{SearchError, SearchResult};

/// Shifts of a year or more cover every month/day, Feb 29 included.
const FULL_CYCLE_DAYS: i64 = 365;

const FIRST_KEY: u16 = 101;
const LAST_KEY: u16 = 1231;

/// Month/day key used for comparisons: `month * 100 + day`, so Dec 25 is 1225.
pub fn month_day_key(date: Date) -> u16 {
    u16::from(u8::from(date.month())) * 100 + u16::from(date.day())
}

/// Upcoming-birthday window expressed over month/day keys, year ignored.
///
/// At most two inclusive ranges: a window that runs past Dec 31 is split into
/// `[start, 1231]` and `[101, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayWindow {
    first: (u16, u16),
    second: Option<(u16, u16)>,
}

impl BirthdayWindow {
    /// Window covering `[today, today + shift_days]` inclusive.
    pub fn new(today: Date, shift_days: i64) -> SearchResult<Self> {
        if shift_days < 0 {
            return Err(SearchError::NegativeShift(shift_days));
        }
        if shift_days >= FULL_CYCLE_DAYS {
            return Ok(Self {
                first: (FIRST_KEY, LAST_KEY),
                second: None,
            });
        }

        // shift_days < 365 here, so the end date is at most one year ahead
        let end = today
            .checked_add(Duration::days(shift_days))
            .unwrap_or(Date::MAX);
        let start_key = month_day_key(today);
        let end_key = month_day_key(end);

        if end.year() == today.year() {
            Ok(Self {
                first: (start_key, end_key),
                second: None,
            })
        } else {
            Ok(Self {
                first: (start_key, LAST_KEY),
                second: Some((FIRST_KEY, end_key)),
            })
        }
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: u16) -> bool {
        let in_range = |(lo, hi): (u16, u16)| lo <= key && key <= hi;
        in_range(self.first) || self.second.map_or(false, in_range)
    }

    #[cfg(test)]
    pub fn contains(&self, birthday: Date) -> bool {
        self.contains_key(month_day_key(birthday))
    }

    /// Both ranges as SQL bind values; a single-range window repeats its range.
    pub fn bounds(&self) -> [(i32, i32); 2] {
        let (lo, hi) = self.first;
        let first = (i32::from(lo), i32::from(hi));
        let second = self
            .second
            .map(|(lo, hi)| (i32::from(lo), i32::from(hi)))
            .unwrap_or(first);
        [first, second]
    }

    pub fn wraps_year(&self) -> bool {
        self.second.is_some()
    }
}
