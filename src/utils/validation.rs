use crate::domain::model::BirthData;
use crate::utils::error::{ChartError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ChartError::Validation {
            field: field_name.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ChartError::Validation {
                field: field_name.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ChartError::Validation {
            field: field_name.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ChartError::Validation {
            field: field_name.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    if value.len() > 255 {
        return Err(ChartError::Validation {
            field: field_name.to_string(),
            reason: "Value exceeds 255 characters".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ChartError::Validation {
            field: field_name.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

impl Validate for BirthData {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("country", &self.country)?;
        validate_non_empty_string("city", &self.city)?;
        validate_range("day", self.day, 1, 31)?;
        validate_range("month", self.month, 1, 12)?;
        validate_range("year", self.year, 1900, 2100)?;
        validate_range("hour", self.hour, 0, 23)?;
        validate_range("minute", self.minute, 0, 59)?;

        // Range checks alone admit dates like Feb 30.
        if chrono::NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(ChartError::Validation {
                field: "day".to_string(),
                reason: format!(
                    "{:04}-{:02}-{:02} is not a valid calendar date",
                    self.year, self.month, self.day
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_birth() -> BirthData {
        BirthData {
            name: "John Doe".to_string(),
            email: None,
            day: 15,
            month: 6,
            year: 1990,
            hour: 14,
            minute: 30,
            country: "Pakistan".to_string(),
            city: "Peshawar".to_string(),
            timezone_is_utc: false,
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("site_base_url", "https://example.com").is_ok());
        assert!(validate_url("site_base_url", "http://example.com").is_ok());
        assert!(validate_url("site_base_url", "").is_err());
        assert!(validate_url("site_base_url", "invalid-url").is_err());
        assert!(validate_url("site_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn valid_birth_data_passes() {
        assert!(valid_birth().validate().is_ok());
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut birth = valid_birth();
        birth.day = 32;
        assert!(birth.validate().is_err());

        let mut birth = valid_birth();
        birth.month = 0;
        assert!(birth.validate().is_err());

        let mut birth = valid_birth();
        birth.year = 1899;
        assert!(birth.validate().is_err());

        let mut birth = valid_birth();
        birth.hour = 24;
        assert!(birth.validate().is_err());

        let mut birth = valid_birth();
        birth.minute = 60;
        assert!(birth.validate().is_err());
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        let mut birth = valid_birth();
        birth.day = 30;
        birth.month = 2;
        assert!(birth.validate().is_err());

        // Leap day on a leap year is fine.
        let mut birth = valid_birth();
        birth.day = 29;
        birth.month = 2;
        birth.year = 2000;
        assert!(birth.validate().is_ok());
    }

    #[test]
    fn empty_and_oversized_strings_are_rejected() {
        let mut birth = valid_birth();
        birth.name = "   ".to_string();
        assert!(birth.validate().is_err());

        let mut birth = valid_birth();
        birth.city = "x".repeat(256);
        assert!(birth.validate().is_err());
    }
}
