//! Input validation helpers
use crate::error::{FareboxError, FareboxResult};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

/// Validate a subscriber phone number: must start with 0 and be exactly
/// 11 digits.
pub fn validate_phone_number(phone: &str) -> FareboxResult<()> {
    let well_formed =
        phone.len() == 11 && phone.starts_with('0') && phone.bytes().all(|b| b.is_ascii_digit());

    if well_formed {
        Ok(())
    } else {
        Err(FareboxError::Validation(
            "Invalid phone number format. It must start with 0 and be 11 digits.".to_string(),
        ))
    }
}

/// Half-open time interval for ledger queries.
///
/// Bounds are accepted as RFC 3339 timestamps or plain `YYYY-MM-DD` dates;
/// a plain end date covers that whole day (the exclusive bound is the next
/// midnight, UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end_exclusive: DateTime<Utc>,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> FareboxResult<Self> {
        let start = parse_bound(start, Bound::Start)?;
        let end_exclusive = parse_bound(end, Bound::End)?;

        if start > end_exclusive {
            return Err(FareboxError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }

        Ok(Self {
            start,
            end_exclusive,
        })
    }
}

enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, which: Bound) -> FareboxResult<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let date = match which {
            Bound::Start => date,
            Bound::End => date.checked_add_days(Days::new(1)).ok_or_else(|| {
                FareboxError::Validation(format!("Date '{}' is out of range", raw))
            })?,
        };
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(FareboxError::Validation(format!(
        "Invalid date '{}' - use YYYY-MM-DD or an RFC 3339 timestamp",
        raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn accepts_well_formed_phone_numbers() {
        assert!(validate_phone_number("05551234567").is_ok());
        assert!(validate_phone_number("09000000000").is_ok());
    }

    #[test]
    fn rejects_malformed_phone_numbers() {
        // wrong leading digit
        assert!(validate_phone_number("15551234567").is_err());
        // too short / too long
        assert!(validate_phone_number("0555123456").is_err());
        assert!(validate_phone_number("055512345678").is_err());
        // non-digits
        assert!(validate_phone_number("0555abc4567").is_err());
        assert!(validate_phone_number("").is_err());
    }

    #[test]
    fn plain_end_date_covers_the_whole_day() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        assert_eq!(range.start.hour(), 0);
        assert_eq!(
            range.end_exclusive - range.start,
            chrono::Duration::days(1)
        );
    }

    #[test]
    fn rfc3339_bounds_are_taken_verbatim() {
        let range =
            DateRange::parse("2024-01-01T06:30:00Z", "2024-01-01T18:00:00Z").unwrap();
        assert_eq!(range.start.hour(), 6);
        assert_eq!(range.end_exclusive.hour(), 18);
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
    }

    #[test]
    fn garbage_bounds_rejected() {
        assert!(DateRange::parse("yesterday", "2024-01-01").is_err());
        assert!(DateRange::parse("2024-01-01", "01/02/2024").is_err());
    }
}
