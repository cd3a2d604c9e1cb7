//! Coordinate parameter parsing.
//!
//! Coordinate actions carry two whitespace-separated numbers. The lenient
//! parser never fails: each field yields its leading decimal number
//! (`"1.5m"` reads as 1.5), and a field with no numeric prefix, or a missing
//! one, becomes `NaN`. The strict parser demands exactly two finite numbers
//! with nothing trailing.

use spear_contracts::error::{MissionError, MissionResult};

/// Parse `"a b"` best-effort. Extra fields are ignored.
pub fn lenient_pair(parameters: &str) -> (f64, f64) {
    let mut fields = parameters.split_whitespace();
    let first = lenient_number(fields.next());
    let second = lenient_number(fields.next());
    (first, second)
}

/// Parse `"a b"` or explain why not.
pub fn strict_pair(tag: &str, parameters: &str) -> MissionResult<(f64, f64)> {
    let invalid = |reason: String| MissionError::InvalidParameters {
        tag: tag.to_string(),
        parameters: parameters.to_string(),
        reason,
    };

    let fields: Vec<&str> = parameters.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(invalid(format!("expected 2 numbers, found {} fields", fields.len())));
    }

    let mut values = [0.0; 2];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a number", field)))?;
        if !value.is_finite() {
            return Err(invalid(format!("'{}' is not a finite number", field)));
        }
        *slot = value;
    }
    Ok((values[0], values[1]))
}

/// The raw fields, `"NaN"` standing in for a missing one.
pub fn raw_pair(parameters: &str) -> (&str, &str) {
    let mut fields = parameters.split_whitespace();
    (fields.next().unwrap_or("NaN"), fields.next().unwrap_or("NaN"))
}

fn lenient_number(field: Option<&str>) -> f64 {
    field
        .map(numeric_prefix)
        .filter(|prefix| !prefix.is_empty())
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Longest prefix of `field` of the form
/// `[+-](Infinity | digits[.digits] | .digits)[(e|E)[+-]digits]`.
fn numeric_prefix(field: &str) -> &str {
    let bytes = field.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if field[end..].starts_with("Infinity") {
        return &field[..end + "Infinity".len()];
    }

    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    &field[..end]
}
