use std::str::FromStr;

use crate::error::ApiError;
use crate::types::UnknownValue;

pub fn require<T>(field: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::missing_field(field))
}

/// Required string that must not be blank; returned trimmed
pub fn require_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    optional_text(value).ok_or_else(|| ApiError::missing_field(field))
}

/// Trims and drops blank strings
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses a vocabulary value, attributing failures to `field`
pub fn parse_field<T>(field: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = UnknownValue>,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| ApiError::field_error(field, e.to_string())))
        .transpose()
}
