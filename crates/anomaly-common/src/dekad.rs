//! Dekad (10-day compositing period) identifiers.
//!
//! The source product line addresses every raster by dekad: three
//! periods per month, days 1-10, 11-20 and 21-end. The orchestration
//! layer resolves dekads to files; the core only carries the identifier.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A 10-day compositing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dekad {
    pub year: i32,
    /// Month 1-12.
    pub month: u32,
    /// Dekad within the month, 1-3.
    pub dekad: u8,
}

impl Dekad {
    /// Create a dekad, validating the month and dekad index.
    pub fn new(year: i32, month: u32, dekad: u8) -> Result<Self, DekadParseError> {
        if !(1..=12).contains(&month) {
            return Err(DekadParseError::InvalidMonth(month));
        }
        if !(1..=3).contains(&dekad) {
            return Err(DekadParseError::InvalidDekad(dekad));
        }
        Ok(Self { year, month, dekad })
    }

    /// The dekad containing a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        let dekad = match date.day() {
            1..=10 => 1,
            11..=20 => 2,
            _ => 3,
        };
        Self {
            year: date.year(),
            month: date.month(),
            dekad,
        }
    }

    /// First day of the dekad.
    pub fn start_date(&self) -> NaiveDate {
        let day = match self.dekad {
            1 => 1,
            2 => 11,
            _ => 21,
        };
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .expect("month is validated at construction and day is 1, 11 or 21")
    }

    /// The previous dekad, crossing month and year boundaries.
    pub fn pred(&self) -> Self {
        if self.dekad > 1 {
            Self {
                dekad: self.dekad - 1,
                ..*self
            }
        } else if self.month > 1 {
            Self {
                year: self.year,
                month: self.month - 1,
                dekad: 3,
            }
        } else {
            Self {
                year: self.year - 1,
                month: 12,
                dekad: 3,
            }
        }
    }

    /// The next dekad, crossing month and year boundaries.
    pub fn succ(&self) -> Self {
        if self.dekad < 3 {
            Self {
                dekad: self.dekad + 1,
                ..*self
            }
        } else if self.month < 12 {
            Self {
                year: self.year,
                month: self.month + 1,
                dekad: 1,
            }
        } else {
            Self {
                year: self.year + 1,
                month: 1,
                dekad: 1,
            }
        }
    }

    /// The same dekad in a different year (LTS baselines iterate years).
    pub fn with_year(&self, year: i32) -> Self {
        Self { year, ..*self }
    }

    /// Parse from "YYYY-MM-dN" (e.g. "2023-05-d2").
    pub fn parse(s: &str) -> Result<Self, DekadParseError> {
        let mut parts = s.splitn(3, '-');
        let (year, month, dek) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(DekadParseError::InvalidFormat(s.to_string())),
        };

        let year: i32 = year
            .parse()
            .map_err(|_| DekadParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| DekadParseError::InvalidFormat(s.to_string()))?;
        let dekad: u8 = dek
            .strip_prefix('d')
            .ok_or_else(|| DekadParseError::InvalidFormat(s.to_string()))?
            .parse()
            .map_err(|_| DekadParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month, dekad)
    }
}

impl std::fmt::Display for Dekad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-d{}", self.year, self.month, self.dekad)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DekadParseError {
    #[error("invalid dekad string: {0}. Expected 'YYYY-MM-dN'")]
    InvalidFormat(String),

    #[error("invalid month: {0}")]
    InvalidMonth(u32),

    #[error("invalid dekad index: {0} (expected 1-3)")]
    InvalidDekad(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date() {
        let d = Dekad::from_date(NaiveDate::from_ymd_opt(2023, 5, 15).unwrap());
        assert_eq!(d, Dekad::new(2023, 5, 2).unwrap());

        let d = Dekad::from_date(NaiveDate::from_ymd_opt(2023, 5, 31).unwrap());
        assert_eq!(d.dekad, 3);
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let d = Dekad::parse("2023-05-d2").unwrap();
        assert_eq!(d.to_string(), "2023-05-d2");
        assert!(Dekad::parse("2023-13-d1").is_err());
        assert!(Dekad::parse("2023-05-d4").is_err());
        assert!(Dekad::parse("202305d2").is_err());
    }

    #[test]
    fn test_pred_succ_cross_boundaries() {
        let d = Dekad::new(2023, 1, 1).unwrap();
        assert_eq!(d.pred(), Dekad::new(2022, 12, 3).unwrap());
        assert_eq!(d.pred().succ(), d);

        let d = Dekad::new(2023, 12, 3).unwrap();
        assert_eq!(d.succ(), Dekad::new(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_start_date() {
        let d = Dekad::new(2023, 5, 3).unwrap();
        assert_eq!(d.start_date(), NaiveDate::from_ymd_opt(2023, 5, 21).unwrap());
    }

    #[test]
    fn test_with_year() {
        let d = Dekad::new(2023, 5, 2).unwrap();
        assert_eq!(d.with_year(2015), Dekad::new(2015, 5, 2).unwrap());
    }
}
