//! TOML date and time values.
//!
//! TOML has four date/time forms, and a [`Datetime`] keeps track of which one
//! was written:
//!
//! | Form                 | Example                        |
//! |----------------------|--------------------------------|
//! | offset date-time     | `1979-05-27T07:32:00-08:00`    |
//! | local date-time      | `1979-05-27T07:32:00.999999`   |
//! | local date           | `1979-05-27`                   |
//! | local time           | `07:32:00`                     |
//!
//! Calendar fields are held as [`chrono`] values, so an impossible date such
//! as `2021-02-30` is rejected when the literal is parsed.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

/// A UTC offset attached to an offset date-time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Offset {
    /// Written as `Z` (or `z`).
    Z,
    /// Written as `+HH:MM` or `-HH:MM`; the value is in minutes east of UTC.
    Minutes(i16),
}

impl Offset {
    /// Offset from UTC in seconds.
    #[must_use]
    pub fn seconds(&self) -> i32 {
        match self {
            Offset::Z => 0,
            Offset::Minutes(m) => i32::from(*m) * 60,
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Z => write!(f, "Z"),
            Offset::Minutes(m) => {
                let sign = if *m < 0 { '-' } else { '+' };
                let abs = m.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
        }
    }
}

/// Which of the four TOML date/time forms a value uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatetimeKind {
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

/// A validated TOML date/time value.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{Datetime, DatetimeKind};
///
/// let dt: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
/// assert_eq!(dt.kind(), DatetimeKind::OffsetDateTime);
/// assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
///
/// assert!("2021-02-30".parse::<Datetime>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datetime {
    OffsetDateTime {
        date: NaiveDate,
        time: NaiveTime,
        offset: Offset,
    },
    LocalDateTime {
        date: NaiveDate,
        time: NaiveTime,
    },
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
}

impl Datetime {
    #[must_use]
    pub const fn kind(&self) -> DatetimeKind {
        match self {
            Datetime::OffsetDateTime { .. } => DatetimeKind::OffsetDateTime,
            Datetime::LocalDateTime { .. } => DatetimeKind::LocalDateTime,
            Datetime::LocalDate(_) => DatetimeKind::LocalDate,
            Datetime::LocalTime(_) => DatetimeKind::LocalTime,
        }
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Datetime::OffsetDateTime { date, .. }
            | Datetime::LocalDateTime { date, .. }
            | Datetime::LocalDate(date) => Some(*date),
            Datetime::LocalTime(_) => None,
        }
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Datetime::OffsetDateTime { time, .. }
            | Datetime::LocalDateTime { time, .. }
            | Datetime::LocalTime(time) => Some(*time),
            Datetime::LocalDate(_) => None,
        }
    }

    #[must_use]
    pub fn offset(&self) -> Option<Offset> {
        match self {
            Datetime::OffsetDateTime { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Converts an offset date-time into a `chrono` instant.
    ///
    /// Returns `None` for the three local forms, which name no instant.
    #[must_use]
    pub fn to_chrono(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Datetime::OffsetDateTime { date, time, offset } => {
                let tz = FixedOffset::east_opt(offset.seconds())?;
                NaiveDateTime::new(*date, *time)
                    .and_local_timezone(tz)
                    .single()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datetime::OffsetDateTime { date, time, offset } => {
                write_date(f, date)?;
                f.write_str("T")?;
                write_time(f, time)?;
                write!(f, "{}", offset)
            }
            Datetime::LocalDateTime { date, time } => {
                write_date(f, date)?;
                f.write_str("T")?;
                write_time(f, time)
            }
            Datetime::LocalDate(date) => write_date(f, date),
            Datetime::LocalTime(time) => write_time(f, time),
        }
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, date: &NaiveDate) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn write_time(f: &mut fmt::Formatter<'_>, time: &NaiveTime) -> fmt::Result {
    // chrono encodes a leap second as second 59 with nanos >= 1e9.
    let mut second = time.second();
    let mut nanos = time.nanosecond();
    if nanos >= 1_000_000_000 {
        second += 1;
        nanos -= 1_000_000_000;
    }
    write!(f, "{:02}:{:02}:{:02}", time.hour(), time.minute(), second)?;
    if nanos > 0 {
        let digits = format!("{:09}", nanos);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl std::str::FromStr for Datetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Serialize for Datetime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Parses and validates a date/time literal.
///
/// The error is a human-readable reason; the parser wraps it into a
/// positioned semantic diagnostic.
pub(crate) fn parse(s: &str) -> Result<Datetime, String> {
    let mut cursor = Cursor::new(s);

    if s.len() >= 3 && s.as_bytes()[2] == b':' {
        let time = cursor.time()?;
        cursor.finish()?;
        return Ok(Datetime::LocalTime(time));
    }

    let date = cursor.date()?;
    match cursor.peek() {
        None => return Ok(Datetime::LocalDate(date)),
        Some(b'T' | b't' | b' ') => cursor.bump(),
        Some(_) => return Err("expected `T` or a space between date and time".to_string()),
    }

    let time = cursor.time()?;
    let offset = match cursor.peek() {
        None => return Ok(Datetime::LocalDateTime { date, time }),
        Some(b'Z' | b'z') => {
            cursor.bump();
            Offset::Z
        }
        Some(sign @ (b'+' | b'-')) => {
            cursor.bump();
            let hours = cursor.digits(2, "offset hour")?;
            cursor.expect(b':', "offset")?;
            let minutes = cursor.digits(2, "offset minute")?;
            if hours > 23 {
                return Err(format!("offset hour {} is out of range", hours));
            }
            if minutes > 59 {
                return Err(format!("offset minute {} is out of range", minutes));
            }
            // bounded above by 23 * 60 + 59
            let total = (hours * 60 + minutes) as i16;
            Offset::Minutes(if sign == b'-' { -total } else { total })
        }
        Some(_) => return Err("unexpected character after time".to_string()),
    };
    cursor.finish()?;
    Ok(Datetime::OffsetDateTime { date, time, offset })
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, b: u8, what: &str) -> Result<(), String> {
        if self.peek() == Some(b) {
            self.bump();
            Ok(())
        } else {
            Err(format!("expected `{}` in {}", b as char, what))
        }
    }

    fn digits(&mut self, count: usize, what: &str) -> Result<u32, String> {
        let mut value = 0u32;
        for _ in 0..count {
            match self.peek() {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u32::from(b - b'0');
                    self.bump();
                }
                _ => return Err(format!("expected {} digits for {}", count, what)),
            }
        }
        Ok(value)
    }

    fn finish(&self) -> Result<(), String> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err("trailing characters".to_string())
        }
    }

    fn date(&mut self) -> Result<NaiveDate, String> {
        let year = self.digits(4, "year")?;
        self.expect(b'-', "date")?;
        let month = self.digits(2, "month")?;
        self.expect(b'-', "date")?;
        let day = self.digits(2, "day")?;
        if !(1..=12).contains(&month) {
            return Err(format!("month {} is out of range", month));
        }
        // year has at most four digits
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| format!("day {} does not exist in {:04}-{:02}", day, year, month))
    }

    fn time(&mut self) -> Result<NaiveTime, String> {
        let hour = self.digits(2, "hour")?;
        self.expect(b':', "time")?;
        let minute = self.digits(2, "minute")?;
        self.expect(b':', "time")?;
        let second = self.digits(2, "second")?;

        let mut nanos = 0u32;
        if self.peek() == Some(b'.') {
            self.bump();
            let start = self.pos;
            let mut scale = 100_000_000u32;
            while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
                // digits past nanosecond precision are truncated
                nanos += u32::from(b - b'0') * scale;
                scale /= 10;
                self.bump();
            }
            if self.pos == start {
                return Err("expected digits after `.`".to_string());
            }
        }

        if hour > 23 {
            return Err(format!("hour {} is out of range", hour));
        }
        if minute > 59 {
            return Err(format!("minute {} is out of range", minute));
        }
        let time = match second {
            0..=59 => NaiveTime::from_hms_nano_opt(hour, minute, second, nanos),
            60 => NaiveTime::from_hms_nano_opt(hour, minute, 59, 1_000_000_000 + nanos),
            _ => None,
        };
        time.ok_or_else(|| format!("second {} is out of range", second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_forms() {
        assert_eq!(
            parse("1979-05-27T07:32:00Z").unwrap().kind(),
            DatetimeKind::OffsetDateTime
        );
        assert_eq!(
            parse("1979-05-27T00:32:00.999999").unwrap().kind(),
            DatetimeKind::LocalDateTime
        );
        assert_eq!(parse("1979-05-27").unwrap().kind(), DatetimeKind::LocalDate);
        assert_eq!(parse("07:32:00").unwrap().kind(), DatetimeKind::LocalTime);
    }

    #[test]
    fn test_space_and_lowercase_separators() {
        let upper = parse("1979-05-27T07:32:00Z").unwrap();
        assert_eq!(parse("1979-05-27 07:32:00Z").unwrap(), upper);
        assert_eq!(parse("1979-05-27t07:32:00z").unwrap(), upper);
    }

    #[test]
    fn test_offsets() {
        let dt = parse("1979-05-27T00:32:00-07:00").unwrap();
        assert_eq!(dt.offset(), Some(Offset::Minutes(-420)));
        assert_eq!(dt.to_string(), "1979-05-27T00:32:00-07:00");

        let instant = dt.to_chrono().unwrap();
        assert_eq!(instant.offset().local_minus_utc(), -7 * 3600);
        assert!(parse("1979-05-27T00:32:00+24:00").is_err());
    }

    #[test]
    fn test_calendar_validation() {
        assert!(parse("2021-02-29").is_err());
        assert!(parse("2020-02-29").is_ok());
        assert!(parse("2021-13-01").is_err());
        assert!(parse("2021-04-31").is_err());
        assert!(parse("24:00:00").is_err());
        assert!(parse("23:60:00").is_err());
    }

    #[test]
    fn test_fraction_display_and_truncation() {
        let dt = parse("07:32:00.5").unwrap();
        assert_eq!(dt.to_string(), "07:32:00.5");

        let dt = parse("07:32:00.1234567891").unwrap();
        assert_eq!(dt.time().unwrap().nanosecond(), 123_456_789);
    }

    #[test]
    fn test_leap_second_round_trip() {
        let dt = parse("1990-12-31T23:59:60Z").unwrap();
        assert_eq!(dt.to_string(), "1990-12-31T23:59:60Z");
    }

    #[test]
    fn test_malformed() {
        assert!(parse("1979-5-27").is_err());
        assert!(parse("07:32").is_err());
        assert!(parse("1979-05-27T07:32:00Zjunk").is_err());
        assert!(parse("07:32:00.").is_err());
    }
}
