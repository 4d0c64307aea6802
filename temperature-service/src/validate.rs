use crate::errors::{Error, Result};
use crate::model::{InputTemperature, TemperatureRequest, TemperatureUnit};

/// Validates a decoded create/update body.
///
/// Every problem is reported at once, joined with `; `. `value` has no range.
pub fn validate(request: &TemperatureRequest) -> Result<InputTemperature> {
    let mut problems = Vec::new();

    if request.id.is_none() {
        problems.push("The id field is required.".to_string());
    }

    if request.value.is_none() {
        problems.push("The value field is required.".to_string());
    }

    let unit = match request.unit {
        None => {
            problems.push("The unit field is required.".to_string());
            None
        }
        Some(raw) => match TemperatureUnit::try_from(raw) {
            Ok(unit) => Some(unit),
            Err(e) => {
                problems.push(format!("The unit field is invalid: {}.", e));
                None
            }
        },
    };

    match (request.id, request.value, unit) {
        (Some(id), Some(value), Some(unit)) if problems.is_empty() => {
            Ok(InputTemperature { id, value, unit })
        }
        _ => Err(Error::Validation(problems.join("; "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: Option<i32>, value: Option<i32>, unit: Option<i64>) -> TemperatureRequest {
        TemperatureRequest { id, value, unit }
    }

    #[test]
    fn test_valid_request() {
        let input = validate(&request(Some(1), Some(100), Some(2))).unwrap();

        assert_eq!(
            input,
            InputTemperature {
                id: 1,
                value: 100,
                unit: TemperatureUnit::Fahrenheit
            }
        );
    }

    #[test]
    fn test_any_value_is_accepted() {
        assert!(validate(&request(Some(1), Some(i32::MIN), Some(1))).is_ok());
        assert!(validate(&request(Some(1), Some(i32::MAX), Some(3))).is_ok());
    }

    #[test]
    fn test_missing_id() {
        match validate(&request(None, Some(10), Some(1))) {
            Err(Error::Validation(msg)) => assert_eq!(msg, "The id field is required."),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_value() {
        assert!(matches!(
            validate(&request(Some(1), None, Some(1))),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_unit() {
        match validate(&request(Some(1), Some(10), Some(4))) {
            Err(Error::Validation(msg)) => assert!(msg.contains("unit 4")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_all_problems_reported() {
        match validate(&TemperatureRequest::default()) {
            Err(Error::Validation(msg)) => {
                assert_eq!(
                    msg,
                    "The id field is required.; The value field is required.; The unit field is required."
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
