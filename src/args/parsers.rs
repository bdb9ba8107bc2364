use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_recording_id(s: &str) -> AppResult<String> {
    let value = s.trim();
    if value.is_empty() {
        return Err(AppError::validation(ValidationError::EmptyRecordingId));
    }
    Ok(value.to_owned())
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let value = s.trim();
    if value.is_empty() {
        return Err(AppError::validation(ValidationError::DurationEmpty));
    }

    let digits_len = value
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(AppError::validation(
            ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            },
        ));
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part.parse().map_err(|err| {
        AppError::validation(ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })
    })?;

    let seconds_per_unit = match unit_part {
        "ms" => {
            return non_zero(Duration::from_millis(number));
        }
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        unit => {
            return Err(AppError::validation(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            }));
        }
    };
    let secs = number
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| AppError::validation(ValidationError::DurationOverflow))?;
    non_zero(Duration::from_secs(secs))
}

fn non_zero(duration: Duration) -> AppResult<Duration> {
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}
