//! Calendar months and the `MMYYYY` period tokens used to select them.

use std::{fmt::Display, str::FromStr};

use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::Error;

/// A calendar month of a specific year, e.g. January 2025.
///
/// Stepping with [YearMonth::previous] and [YearMonth::next] returns a new value and wraps
/// across year boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a year-month from its parts.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that contains `date_time`, in UTC.
    pub fn containing(date_time: OffsetDateTime) -> Self {
        let date_time = date_time.to_offset(UtcOffset::UTC);

        Self::new(date_time.year(), date_time.month())
    }

    /// The year, e.g. `2025`.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The month before this one.
    pub fn previous(self) -> Self {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    /// The month after this one.
    pub fn next(self) -> Self {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }

    /// The `count` consecutive months that end with this month, oldest first.
    pub fn trailing(self, count: usize) -> Vec<Self> {
        let mut months: Vec<Self> =
            std::iter::successors(Some(self), |month| Some(month.previous()))
                .take(count)
                .collect();
        months.reverse();

        months
    }

    /// Midnight UTC on the first day of the month.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if the year cannot be represented.
    pub fn start(&self) -> Result<OffsetDateTime, Error> {
        let date = Date::from_calendar_date(self.year, self.month, 1)
            .map_err(|_| Error::InvalidPeriod(self.token()))?;

        Ok(date.midnight().assume_utc())
    }

    /// The last millisecond of the month in UTC, i.e. 23:59:59.999 on its last day.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if the year cannot be represented.
    pub fn end(&self) -> Result<OffsetDateTime, Error> {
        let last_day = self.month.length(self.year);

        Date::from_calendar_date(self.year, self.month, last_day)
            .and_then(|date| date.with_hms_milli(23, 59, 59, 999))
            .map(|date_time| date_time.assume_utc())
            .map_err(|_| Error::InvalidPeriod(self.token()))
    }

    /// The inclusive UTC range covering the whole month.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if the year cannot be represented.
    pub fn range(&self) -> Result<DateRange, Error> {
        Ok(DateRange {
            start: self.start()?,
            end: self.end()?,
        })
    }

    /// The `MMYYYY` token for this month, e.g. `012025`.
    pub fn token(&self) -> String {
        format!("{:02}{:04}", u8::from(self.month), self.year)
    }

    /// A short label such as `Jan 2025`.
    pub fn short_label(&self) -> String {
        let month_name = self.month.to_string();

        format!("{} {}", &month_name[..3], self.year)
    }

    /// A long label such as `January 2025`.
    pub fn long_label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse an `MMYYYY` token, e.g. `012025` for January 2025.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriod(token.to_owned());

        if token.len() != 6 || !token.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u8 = token[..2].parse().map_err(|_| invalid())?;
        let year: i32 = token[2..].parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self::new(year, month))
    }
}

/// An inclusive range of UTC date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first instant in the range.
    pub start: OffsetDateTime,
    /// The last instant in the range.
    pub end: OffsetDateTime,
}

/// The selected month and the month before it, with their date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    /// The month the user asked for.
    pub current: YearMonth,
    /// The range covering [ResolvedPeriod::current].
    pub current_range: DateRange,
    /// The month before [ResolvedPeriod::current].
    pub previous: YearMonth,
    /// The range covering [ResolvedPeriod::previous].
    pub previous_range: DateRange,
}

/// Resolve the month to report on, defaulting to the month containing `now`.
///
/// # Errors
/// Returns [Error::InvalidPeriod] if the month's year cannot be represented.
pub fn resolve_period(
    period: Option<YearMonth>,
    now: OffsetDateTime,
) -> Result<ResolvedPeriod, Error> {
    let current = period.unwrap_or_else(|| YearMonth::containing(now));
    let previous = current.previous();

    Ok(ResolvedPeriod {
        current,
        current_range: current.range()?,
        previous,
        previous_range: previous.range()?,
    })
}

/// Parse an optional period token, treating an empty token as absent.
///
/// # Errors
/// Returns [Error::InvalidPeriod] if the token is not in the `MMYYYY` format.
pub fn parse_period(token: Option<&str>) -> Result<Option<YearMonth>, Error> {
    match token {
        None | Some("") => Ok(None),
        Some(token) => token.parse().map(Some),
    }
}
