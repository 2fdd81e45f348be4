//! String helpers used for bot messages and command input.
//!
//! [`format`] implements the positional `{0}` placeholders used throughout bot
//! message templates; the parsing helpers accept loose user input such as
//! `1h30m` durations.

use std::fmt::Display;
use tracing::warn;

/// Turns an enum-style constant name into a display name: `"SOME_VALUE"` becomes `"Some Value"`.
#[must_use]
pub fn enum_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut next_upper = true;
    for letter in name.chars() {
        if letter == '_' {
            result.push(' ');
            next_upper = true;
            continue;
        }
        if next_upper {
            result.extend(letter.to_uppercase());
        } else {
            result.extend(letter.to_lowercase());
        }
        next_upper = false;
    }
    result
}

/// Replaces `{N}` placeholders with the `N`-th argument.
///
/// Placeholders with a non-numeric or out-of-range index are kept as written
/// and logged. An unterminated `{` at the end of the pattern is kept as well.
#[must_use]
pub fn format(pattern: &str, args: &[&dyn Display]) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut argument: Option<String> = None;

    for c in pattern.chars() {
        match argument.take() {
            Some(index) if c == '}' => {
                match index.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(value) => result.push_str(&value.to_string()),
                    None => {
                        warn!("Invalid argument index '{}'", index);
                        result.push('{');
                        result.push_str(&index);
                        result.push('}');
                    }
                }
            }
            Some(mut index) => {
                index.push(c);
                argument = Some(index);
            }
            None if c == '{' => argument = Some(String::new()),
            None => result.push(c),
        }
    }

    if let Some(rest) = argument {
        result.push('{');
        result.push_str(&rest);
    }
    result
}

/// Applies `from → to` replacements in order.
#[must_use]
pub fn replace_all(input: &str, replacements: &[(&str, &dyn Display)]) -> String {
    replacements
        .iter()
        .fold(input.to_string(), |value, (from, to)| {
            value.replace(from, &to.to_string())
        })
}

/// Everything after the last occurrence of `separator`, or an empty string if it does not occur.
#[must_use]
pub fn after_last<'a>(input: &'a str, separator: &str) -> &'a str {
    input
        .rfind(separator)
        .map_or("", |index| &input[index + separator.len()..])
}

pub fn join<I, T>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut result = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            result.push_str(separator);
        }
        result.push_str(&item.to_string());
    }
    result
}

#[must_use]
pub fn repeat(sequence: &str, amount: usize) -> String {
    sequence.repeat(amount)
}

const fn unit_multiplier(unit: char) -> u64 {
    match unit.to_ascii_lowercase() {
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        'w' => 7 * 24 * 60 * 60,
        'y' => 365 * 24 * 60 * 60,
        _ => 1,
    }
}

/// Parses a compact duration such as `1h30m` or `2d 5s` into seconds.
///
/// Returns `None` for permanent durations (input starting with `perm`).
/// Digits not followed by a unit count as seconds.
#[must_use]
pub fn parse_seconds(input: &str) -> Option<u64> {
    if input.trim_start().to_lowercase().starts_with("perm") {
        return None;
    }

    let mut current: u64 = 0;
    let mut seconds: u64 = 0;
    for c in input.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = current.saturating_mul(10).saturating_add(u64::from(digit));
        } else {
            seconds = seconds.saturating_add(current.saturating_mul(unit_multiplier(c)));
            current = 0;
        }
    }
    Some(seconds.saturating_add(current))
}

#[must_use]
pub fn is_number(sequence: &str) -> bool {
    sequence.trim().parse::<f64>().is_ok()
}

/// Parses a number, falling back to `0.0`.
#[must_use]
pub fn parse_number(sequence: &str) -> f64 {
    sequence.trim().parse().unwrap_or(0.0)
}

/// The first whitespace-separated part that parses as a number.
#[must_use]
pub fn find_first_number(sequence: &str) -> Option<f64> {
    sequence.split_whitespace().find_map(|part| part.parse().ok())
}

/// The first whitespace-separated part that contains a digit.
#[must_use]
pub fn find_first_number_part(sequence: &str) -> Option<&str> {
    sequence
        .split_whitespace()
        .find(|part| part.chars().any(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_enum_name() {
        assert_eq!(enum_name("MANAGE_GUILD"), "Manage Guild");
        assert_eq!(enum_name("owner"), "Owner");
        assert_eq!(enum_name(""), "");
    }

    #[test]
    fn test_format_positional_arguments() {
        assert_eq!(format("{0} has {1} members", &[&"guild", &42]), "guild has 42 members");
        assert_eq!(format("{1}{0}{1}", &[&"a", &"b"]), "bab");
    }

    #[test]
    fn test_format_keeps_invalid_placeholders() {
        assert_eq!(format("value {2}", &[&1]), "value {2}");
        assert_eq!(format("value {x}", &[&1]), "value {x}");
        assert_eq!(format("open {0", &[&1]), "open {0");
    }

    #[test]
    fn test_replace_all_and_after_last() {
        assert_eq!(
            replace_all("%user% joined %guild%", &[("%user%", &"bob"), ("%guild%", &"rust")]),
            "bob joined rust"
        );
        assert_eq!(after_last("net.guild.Prefix", "."), "Prefix");
        assert_eq!(after_last("nothing", "."), "");
    }

    #[test]
    fn test_join_and_repeat() {
        assert_eq!(join(["a", "b", "c"], ", "), "a, b, c");
        assert_eq!(join(Vec::<String>::new(), ", "), "");
        assert_eq!(repeat("ab", 3), "ababab");
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("1h30m"), Some(5400));
        assert_eq!(parse_seconds("2d"), Some(172_800));
        assert_eq!(parse_seconds("45"), Some(45));
        assert_eq!(parse_seconds("1w 10s"), Some(604_810));
        assert_eq!(parse_seconds("PERMANENT"), None);
    }

    #[test]
    fn test_number_helpers() {
        assert!(is_number("3.5"));
        assert!(!is_number("three"));
        assert_eq!(parse_number("nope"), 0.0);
        assert_eq!(find_first_number("pay 12.5 now"), Some(12.5));
        assert_eq!(find_first_number("no numbers"), None);
        assert_eq!(find_first_number_part("wait 10min please"), Some("10min"));
    }
}
