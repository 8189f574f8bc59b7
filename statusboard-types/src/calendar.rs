//! Calendar arithmetic for strips and month grids.
//!
//! Everything here works on plain calendar dates. The caller decides what
//! "today" is in the viewer's zone and passes it in.

use chrono::{Datelike, Days, NaiveDate};

use crate::DateKey;

/// Column headers of a Sunday-first month grid.
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The `days` calendar days ending at `today`, oldest first.
///
/// ```rust
/// use chrono::NaiveDate;
/// use statusboard_types::strip_dates;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let keys: Vec<String> = strip_dates(today, 3).iter().map(|k| k.to_string()).collect();
/// assert_eq!(keys, ["2025-02-27", "2025-02-28", "2025-03-01"]);
/// ```
pub fn strip_dates(today: NaiveDate, days: usize) -> Vec<DateKey> {
    (0..days as u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(DateKey::new)
        .collect()
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
            _ => 0,
        }
    }

    /// Title such as `December 2025`.
    pub fn title(&self) -> String {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        let name = NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }
}

/// The `months` most recent months ending with the one containing `today`,
/// oldest first.
pub fn recent_months(today: NaiveDate, months: usize) -> Vec<YearMonth> {
    let mut out = Vec::with_capacity(months);
    let mut current = YearMonth::of(today);
    for _ in 0..months {
        out.push(current);
        current = current.prev();
    }
    out.reverse();
    out
}

/// Layout of one month as a Sunday-first grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    /// Empty cells before the 1st.
    pub leading_blanks: usize,
    /// Every day of the month in order.
    pub days: Vec<DateKey>,
}

impl MonthGrid {
    pub fn new(month: YearMonth) -> Self {
        let Some(first) = month.first_day() else {
            return Self {
                month,
                leading_blanks: 0,
                days: Vec::new(),
            };
        };

        let days = first
            .iter_days()
            .take_while(|d| d.month() == month.month)
            .map(DateKey::new)
            .collect();

        Self {
            month,
            leading_blanks: first.weekday().num_days_from_sunday() as usize,
            days,
        }
    }

    /// Rows of seven cells; `None` pads before the 1st and after the last day.
    pub fn weeks(&self) -> Vec<[Option<DateKey>; 7]> {
        let cells: Vec<Option<DateKey>> = std::iter::repeat(None)
            .take(self.leading_blanks)
            .chain(self.days.iter().copied().map(Some))
            .collect();

        cells
            .chunks(7)
            .map(|chunk| {
                let mut week = [None; 7];
                week[..chunk.len()].copy_from_slice(chunk);
                week
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn strip_ends_today_and_runs_oldest_first() {
        let keys = strip_dates(date(2025, 12, 10), 90);
        assert_eq!(keys.len(), 90);
        assert_eq!(keys.last().unwrap().to_string(), "2025-12-10");
        assert_eq!(keys.first().unwrap().to_string(), "2025-09-12");
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn strip_crosses_leap_day() {
        let keys: Vec<String> = strip_dates(date(2024, 3, 1), 3)
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, ["2024-02-28", "2024-02-29", "2024-03-01"]);
    }

    #[test]
    fn empty_strip() {
        assert!(strip_dates(date(2025, 1, 1), 0).is_empty());
    }

    #[test]
    fn month_navigation_wraps_years() {
        let jan = YearMonth { year: 2025, month: 1 };
        assert_eq!(jan.prev(), YearMonth { year: 2024, month: 12 });
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(jan.title(), "January 2025");
    }

    #[test]
    fn days_in_month() {
        assert_eq!(YearMonth { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(YearMonth { year: 2025, month: 2 }.days_in_month(), 28);
        assert_eq!(YearMonth { year: 2025, month: 12 }.days_in_month(), 31);
    }

    #[test]
    fn recent_months_end_with_current() {
        let months = recent_months(date(2025, 2, 14), 3);
        assert_eq!(
            months,
            vec![
                YearMonth { year: 2024, month: 12 },
                YearMonth { year: 2025, month: 1 },
                YearMonth { year: 2025, month: 2 },
            ]
        );
    }

    #[test]
    fn grid_starts_on_correct_weekday() {
        // 1 December 2025 is a Monday.
        let grid = MonthGrid::new(YearMonth { year: 2025, month: 12 });
        assert_eq!(grid.leading_blanks, 1);
        assert_eq!(grid.days.len(), 31);

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0], None);
        assert_eq!(weeks[0][1].unwrap().to_string(), "2025-12-01");
        assert_eq!(weeks[4][3].unwrap().to_string(), "2025-12-31");
        assert_eq!(weeks[4][4], None);
    }

    #[test]
    fn february_starting_sunday_fills_four_rows() {
        // 1 February 2015 is a Sunday, and 2015 is not a leap year.
        let grid = MonthGrid::new(YearMonth { year: 2015, month: 2 });
        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.weeks().len(), 4);
    }
}
