//! Chilean national ID (RUT) validation.
//!
//! A RUT is written as `<body>-<check>`, where the body is a run of digits,
//! optionally grouped in thousands with `.` (`12.345.678-5`), and the check
//! character is a digit or `K`. The check character is the modulo-11 digit
//! of the body computed with the repeating weights `2..=7` from the right.

use thiserror::Error;

const WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];

/// Reasons a RUT string is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RutError {
    /// The string is missing or not shaped like `<digits>-<check>`.
    #[error("invalid RUT format, expected 12.345.678-5")]
    Format,
    /// The check character does not match the body.
    #[error("invalid RUT: check digit does not match")]
    Checksum,
}

/// Validate a RUT string's format and check digit.
pub fn validate_rut(input: Option<&str>) -> Result<(), RutError> {
    let input = input.ok_or(RutError::Format)?;
    let normalized = input.trim().replace('.', "");

    let mut parts = normalized.split('-');
    let (Some(body), Some(check), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RutError::Format);
    };

    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RutError::Format);
    }

    if check.to_ascii_uppercase() != check_digit(body) {
        return Err(RutError::Checksum);
    }

    Ok(())
}

/// Compute the expected check character for an all-digit body.
///
/// The caller guarantees `body` holds only ASCII digits.
#[must_use]
pub fn check_digit(body: &str) -> String {
    let sum: u32 = body
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .zip(WEIGHTS.iter().cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - sum % 11 {
        11 => "0".to_string(),
        10 => "K".to_string(),
        n => n.to_string(),
    }
}

/// Adapter for `#[validate(custom(function = ...))]` on optional request
/// fields. A blank value means "no RUT" and passes.
pub fn validate_rut_field(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }

    validate_rut(Some(value)).map_err(|err| {
        let mut error = validator::ValidationError::new("rut");
        error.message = Some(err.to_string().into());
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_rut_is_valid() {
        // 8*2 + 7*3 + 6*4 + 5*5 + 4*6 + 3*7 + 2*2 + 1*3 = 138; 138 % 11 = 6; 11 - 6 = 5
        assert_eq!(validate_rut(Some("12.345.678-5")), Ok(()));
        assert_eq!(validate_rut(Some("12345678-5")), Ok(()));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(validate_rut(Some("  12.345.678-5\n")), Ok(()));
    }

    #[test]
    fn test_missing_input_is_format_error() {
        assert_eq!(validate_rut(None), Err(RutError::Format));
    }

    #[test]
    fn test_non_digit_body_is_format_error() {
        assert_eq!(validate_rut(Some("abc-5")), Err(RutError::Format));
        assert_eq!(validate_rut(Some("12a45-5")), Err(RutError::Format));
        assert_eq!(validate_rut(Some("-5")), Err(RutError::Format));
    }

    #[test]
    fn test_separator_count_is_format_error() {
        assert_eq!(validate_rut(Some("123456785")), Err(RutError::Format));
        assert_eq!(validate_rut(Some("12-345-5")), Err(RutError::Format));
        assert_eq!(validate_rut(Some("")), Err(RutError::Format));
    }

    #[test]
    fn test_k_check_for_body_123_is_checksum_error() {
        // 3*2 + 2*3 + 1*4 = 16; 16 % 11 = 5; 11 - 5 = 6
        assert_eq!(check_digit("123"), "6");
        assert_eq!(validate_rut(Some("123-6")), Ok(()));
        assert_eq!(validate_rut(Some("123-K")), Err(RutError::Checksum));
    }

    #[test]
    fn test_k_and_zero_check_characters() {
        // 6*2 = 12; 12 % 11 = 1; 11 - 1 = 10 -> K
        assert_eq!(check_digit("6"), "K");
        assert_eq!(validate_rut(Some("6-K")), Ok(()));
        assert_eq!(validate_rut(Some("6-k")), Ok(()));
        // 4*2 + 1*3 = 11; 11 % 11 = 0; 11 - 0 = 11 -> 0
        assert_eq!(check_digit("14"), "0");
        assert_eq!(validate_rut(Some("14-0")), Ok(()));
    }

    #[test]
    fn test_weights_wrap_after_six_digits() {
        // 1*(2+3+4+5+6+7+2+3) = 32; 32 % 11 = 10; 11 - 10 = 1
        assert_eq!(check_digit("11111111"), "1");
        assert_eq!(validate_rut(Some("11.111.111-1")), Ok(()));
    }

    #[test]
    fn test_flipping_check_character_fails() {
        let valid = ["12.345.678-5", "123-6", "6-K", "14-0", "11.111.111-1"];
        let alphabet = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "K"];

        for rut in valid {
            let (body, check) = rut.rsplit_once('-').unwrap();
            for other in alphabet.iter().filter(|c| **c != check) {
                let flipped = format!("{body}-{other}");
                assert_eq!(
                    validate_rut(Some(&flipped)),
                    Err(RutError::Checksum),
                    "{flipped} should fail"
                );
            }
        }
    }

    #[test]
    fn test_field_adapter_carries_message() {
        let err = validate_rut_field("123-K").unwrap_err();
        assert_eq!(err.code, "rut");
        assert!(err.message.is_some());
        assert!(validate_rut_field("12.345.678-5").is_ok());
        assert!(validate_rut_field("  ").is_ok());
    }
}
