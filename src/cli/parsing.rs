//! CLI parsing helpers for clap value parsers and environment toggles.

use serde_json::Value;

/// Configuration keys that hold booleans.
const TOGGLE_FIELDS: [&str; 5] = ["verbose", "progress", "raylib", "sqlite", "asan"];

pub(super) fn parse_jobs(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    if (1..=super::MAX_JOBS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("jobs must be between 1 and {}", super::MAX_JOBS))
    }
}

/// Interpret a toggle written the way Makefile variables usually are.
///
/// Accepts `0/1`, `true/false`, `yes/no` and `on/off` in any case. An empty
/// value counts as off.
pub(super) fn parse_toggle(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("'{s}' is not a valid toggle; use 0 or 1")),
    }
}

/// A toggle value that could not be read as a boolean.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct InvalidToggle {
    pub(super) key: &'static str,
    pub(super) message: String,
}

/// Rewrite boolean entries of a file or environment layer as JSON booleans.
///
/// Figment reads `RIVET_ASAN=1` and `asan = 1` as numbers, which would not
/// deserialise into a `bool` field. A `null` entry is left for the merge to
/// treat as unset.
pub(super) fn normalise_toggles(value: &mut Value) -> Result<(), InvalidToggle> {
    let Value::Object(map) = value else {
        return Ok(());
    };
    for key in TOGGLE_FIELDS {
        let Some(entry) = map.get_mut(key) else {
            continue;
        };
        let toggle = match entry {
            Value::Null => continue,
            Value::Bool(flag) => *flag,
            Value::Number(number) => match number.as_u64() {
                Some(0) => false,
                Some(1) => true,
                _ => {
                    return Err(InvalidToggle {
                        key,
                        message: format!("'{number}' is not a valid toggle; use 0 or 1"),
                    });
                }
            },
            Value::String(text) => {
                parse_toggle(text).map_err(|message| InvalidToggle { key, message })?
            }
            other => {
                return Err(InvalidToggle {
                    key,
                    message: format!("{other} is not a valid toggle; use 0 or 1"),
                });
            }
        };
        *entry = Value::Bool(toggle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("1", Ok(1))]
    #[case("64", Ok(64))]
    #[case("0", Err("jobs must be between 1 and 64".to_owned()))]
    #[case("65", Err("jobs must be between 1 and 64".to_owned()))]
    #[case("many", Err("many is not a valid number".to_owned()))]
    fn validates_jobs(#[case] input: &str, #[case] expected: Result<usize, String>) {
        assert_eq!(parse_jobs(input), expected);
    }

    #[rstest]
    #[case("1", true)]
    #[case("ON", true)]
    #[case("Yes", true)]
    #[case("true", true)]
    #[case("0", false)]
    #[case("off", false)]
    #[case("", false)]
    fn parses_toggles(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(parse_toggle(input), Ok(expected));
    }

    #[test]
    fn rejects_unknown_toggle_text() {
        assert!(parse_toggle("maybe").is_err());
    }

    #[test]
    fn normalises_numeric_and_textual_toggles() {
        let mut value = json!({ "raylib": 1, "sqlite": "off", "asan": true, "jobs": 2 });
        normalise_toggles(&mut value).expect("normalise");
        assert_eq!(
            value,
            json!({ "raylib": true, "sqlite": false, "asan": true, "jobs": 2 })
        );
    }

    #[test]
    fn normalises_logging_and_progress_switches() {
        let mut value = json!({ "verbose": "1", "progress": 0, "name": "game" });
        normalise_toggles(&mut value).expect("normalise");
        assert_eq!(
            value,
            json!({ "verbose": true, "progress": false, "name": "game" })
        );
    }

    #[test]
    fn reports_the_offending_toggle() {
        let mut value = json!({ "asan": 2 });
        let err = normalise_toggles(&mut value).expect_err("invalid toggle");
        assert_eq!(err.key, "asan");
    }
}
