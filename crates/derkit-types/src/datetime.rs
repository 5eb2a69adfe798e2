//! Calendar date-time values for UTCTime and GeneralizedTime.

use crate::error::DerError;

/// Wire format of a [`DateTime`].
///
/// UTCTime covers 1950..=2049 with a two-digit year; GeneralizedTime carries
/// a four-digit year. Decoding records the format found on the wire so that
/// re-encoding reproduces the original bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeFormat {
    Utc,
    Generalized,
}

/// A validated calendar date-time, always interpreted as UTC.
///
/// Seconds run to 60 to accommodate leap seconds. The value carries no
/// offset; local-time forms are rejected by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    format: DateTimeFormat,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Build a date-time, checking every component range.
    pub fn new(
        format: DateTimeFormat,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DerError> {
        let year_ok = match format {
            DateTimeFormat::Utc => (1950..=2049).contains(&year),
            DateTimeFormat::Generalized => year <= 9999,
        };
        if !year_ok
            || !(1..=12).contains(&month)
            || !(1..=31).contains(&day)
            || hour > 23
            || minute > 59
            || second > 60
        {
            return Err(DerError::InvalidDateTime);
        }
        Ok(Self {
            format,
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub fn format(&self) -> DateTimeFormat {
        self.format
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Same instant under a different wire format; fails if the year is
    /// outside the target format's range.
    pub fn with_format(self, format: DateTimeFormat) -> Result<Self, DerError> {
        Self::new(
            format, self.year, self.month, self.day, self.hour, self.minute, self.second,
        )
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_components() {
        let dt = DateTime::new(DateTimeFormat::Utc, 2024, 1, 15, 13, 30, 0).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_leap_second_accepted() {
        assert!(DateTime::new(DateTimeFormat::Utc, 2016, 12, 31, 23, 59, 60).is_ok());
    }

    #[test]
    fn test_component_ranges_rejected() {
        let bad = [
            (2024u16, 0u8, 1u8, 0u8, 0u8, 0u8),
            (2024, 13, 1, 0, 0, 0),
            (2024, 1, 0, 0, 0, 0),
            (2024, 1, 32, 0, 0, 0),
            (2024, 1, 1, 24, 0, 0),
            (2024, 1, 1, 0, 60, 0),
            (2024, 1, 1, 0, 0, 61),
        ];
        for (y, mo, d, h, mi, s) in bad {
            assert_eq!(
                DateTime::new(DateTimeFormat::Utc, y, mo, d, h, mi, s),
                Err(DerError::InvalidDateTime),
                "{y}-{mo}-{d} {h}:{mi}:{s}"
            );
        }
    }

    #[test]
    fn test_utc_year_window() {
        assert!(DateTime::new(DateTimeFormat::Utc, 1950, 1, 1, 0, 0, 0).is_ok());
        assert!(DateTime::new(DateTimeFormat::Utc, 2049, 12, 31, 0, 0, 0).is_ok());
        assert_eq!(
            DateTime::new(DateTimeFormat::Utc, 1949, 12, 31, 0, 0, 0),
            Err(DerError::InvalidDateTime)
        );
        assert_eq!(
            DateTime::new(DateTimeFormat::Utc, 2050, 1, 1, 0, 0, 0),
            Err(DerError::InvalidDateTime)
        );
        assert!(DateTime::new(DateTimeFormat::Generalized, 2050, 1, 1, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_with_format() {
        let dt = DateTime::new(DateTimeFormat::Generalized, 2024, 6, 1, 12, 0, 0).unwrap();
        let utc = dt.with_format(DateTimeFormat::Utc).unwrap();
        assert_eq!(utc.format(), DateTimeFormat::Utc);
        assert_eq!(utc.year(), 2024);

        let far = DateTime::new(DateTimeFormat::Generalized, 2120, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            far.with_format(DateTimeFormat::Utc),
            Err(DerError::InvalidDateTime)
        );
    }

    #[test]
    fn test_display() {
        let dt = DateTime::new(DateTimeFormat::Utc, 2024, 1, 15, 13, 30, 0).unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 13:30:00Z");
    }
}
