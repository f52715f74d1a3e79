//! Request-level checks that run at the top of each handler, before any
//! store access. Each helper returns a typed value that the service layer
//! can trust without re-checking.

use chrono::{DateTime, NaiveDateTime, Utc};
use validator::Validate;

use crate::error::AppError;
use crate::models::datetime::FORMAT;
use crate::models::event::{EventSort, EventState};

/// An offset/limit window that has already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: i64,
    limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Index range of this page within a slice of `len` items.
    pub fn bounds(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        start..end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 1000,
        }
    }
}

impl Paging {
    pub fn page(&self, from: Option<i64>, size: Option<i64>) -> Result<Page, AppError> {
        let from = from.unwrap_or(0);
        let size = size.unwrap_or(self.default_size);
        if from < 0 {
            tracing::info!("Invalid parameter from: {from}, from must be greater than or equal to 0");
            return Err(AppError::InvalidParameter(format!(
                "Invalid parameter from: {from}, from must be greater than or equal to 0"
            )));
        }
        if size <= 0 {
            tracing::info!("Invalid parameter size: {size}, size must be greater than 0");
            return Err(AppError::InvalidParameter(format!(
                "Invalid parameter size: {size}, size must be greater than 0"
            )));
        }
        if size > self.max_size {
            tracing::debug!("Clamping size {size} to {}", self.max_size);
        }
        Ok(Page {
            offset: from,
            limit: size.min(self.max_size),
        })
    }
}

/// Inclusive bounds on an event date. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            tracing::info!("Invalid range: rangeStart {s} is after rangeEnd {e}");
            return Err(AppError::InvalidParameter(format!(
                "rangeStart ({}) must not be after rangeEnd ({})",
                s.format(FORMAT),
                e.format(FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, AppError> {
        Self::new(
            parse_timestamp("rangeStart", start)?,
            parse_timestamp("rangeEnd", end)?,
        )
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at <= e)
    }
}

pub fn parse_timestamp(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(raw, FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| {
            tracing::info!("Invalid parameter {name}: {raw}");
            AppError::InvalidParameter(format!(
                "Invalid parameter {name}: {raw}, expected yyyy-MM-dd HH:mm:ss"
            ))
        })
}

/// Parse repeated and/or comma separated id parameters.
pub fn parse_ids(name: &str, raw: &[String]) -> Result<Vec<i64>, AppError> {
    split_values(raw)
        .map(|value| {
            value.parse::<i64>().map_err(|_| {
                tracing::info!("Invalid parameter {name}: {value}");
                AppError::InvalidParameter(format!("Invalid parameter {name}: {value}"))
            })
        })
        .collect()
}

pub fn parse_states(raw: &[String]) -> Result<Vec<EventState>, AppError> {
    split_values(raw)
        .map(|value| {
            value.parse::<EventState>().map_err(|_| {
                tracing::info!("Invalid parameter states: {value}");
                AppError::InvalidParameter(format!("Unknown event state: {value}"))
            })
        })
        .collect()
}

pub fn parse_sort(raw: Option<&str>) -> Result<EventSort, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(EventSort::Id),
        Some(value) => value.parse().map_err(|_| {
            tracing::info!("Invalid parameter sort: {value}");
            AppError::InvalidParameter(format!(
                "Unknown sort: {value}, expected EVENT_DATE or VIEWS"
            ))
        }),
    }
}

/// Run the declared field rules of a request body.
pub fn validate_payload<T: Validate>(what: &str, input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        tracing::info!("Rejected {what}: {errors}");
        AppError::from(errors)
    })
}

fn split_values(raw: &[String]) -> impl Iterator<Item = &str> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
