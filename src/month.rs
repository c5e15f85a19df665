//! The calendar month that pages are filtered by, e.g. `?month=2025-03`.

use std::fmt::Display;

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{Error, html::LINK_STYLE, timezone::local_today};

/// A calendar month in a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: time::Month,
}

impl Month {
    /// The month that contains `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a month formatted as "YYYY-MM".
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `text` is not a valid month, or if it is
    /// the last month that can be represented (December 9999).
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = time::Month::try_from(month).map_err(|_| invalid())?;
        let month = Self { year, month };

        if !month.is_supported() {
            return Err(invalid());
        }

        Ok(month)
    }

    /// Whether the first day of the following month can be represented.
    ///
    /// The last day of a month is found through the next month, so only
    /// supported months may be displayed.
    pub fn is_supported(&self) -> bool {
        let next = self.next();

        Date::from_calendar_date(next.year, next.month, 1).is_ok()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).expect("every month has a first day")
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        self.next()
            .first_day()
            .previous_day()
            .expect("the first of a month always has a previous day")
    }

    /// The number of days in the month.
    pub fn day_count(&self) -> u8 {
        self.last_day().day()
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        match self.month {
            time::Month::January => Self {
                year: self.year - 1,
                month: time::Month::December,
            },
            month => Self {
                year: self.year,
                month: month.previous(),
            },
        }
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        match self.month {
            time::Month::December => Self {
                year: self.year + 1,
                month: time::Month::January,
            },
            month => Self {
                year: self.year,
                month: month.next(),
            },
        }
    }

    /// The month name and year for display, e.g. "March 2025".
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

/// The query string for pages that show a single month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month formatted as "YYYY-MM". Defaults to the current month.
    pub month: Option<String>,
}

impl MonthQuery {
    /// The month in the query, or the current month in `local_timezone`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidMonth] if the month cannot be parsed, or an
    /// [Error::InvalidTimezoneError] if the current month cannot be determined.
    pub fn resolve(&self, local_timezone: &str) -> Result<Month, Error> {
        match self.month.as_deref() {
            Some(text) if !text.trim().is_empty() => Month::parse(text),
            _ => local_today(local_timezone).map(Month::containing),
        }
    }
}

/// Links to the previous and next month around the current month's name.
pub fn month_selector(endpoint: &str, month: Month) -> Markup {
    let previous = month.previous();
    let next = month.next();

    html! {
        nav class="flex items-center justify-between w-full max-w-md my-4" aria-label="Month"
        {
            a
                href={ (endpoint) "?month=" (previous) }
                class=(LINK_STYLE)
                aria-label="Previous month"
            {
                "← " (previous.label())
            }

            h2 class="text-lg font-semibold" { (month.label()) }

            a
                href={ (endpoint) "?month=" (next) }
                class=(LINK_STYLE)
                aria-label="Next month"
            {
                (next.label()) " →"
            }
        }
    }
}
