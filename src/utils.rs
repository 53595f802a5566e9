use crate::regex::Regex;
use chrono::NaiveDate;
use itertools::Itertools;
use std::sync::LazyLock;

static NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n|\r").unwrap());

static DAY_FIRST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})$").unwrap());

/// Render a float the way a spreadsheet user reads it: integral values
/// without a fractional part.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Split a full name into first and last name by word count.
///
/// # Arguments
///
/// * `full_name` - Whitespace separated name, e.g. "Juan Carlos Pérez Gómez"
///
/// Returns `None` when the name has no words.
pub fn split_full_name(full_name: &str) -> Option<(String, String)> {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    match words.len() {
        0 => None,
        1 => Some((words[0].to_string(), String::new())),
        2 => Some((words[0].to_string(), words[1].to_string())),
        n => Some((words[..n - 2].join(" "), words[n - 2..].join(" "))),
    }
}

/// Keep only the date portion of a `date time` string.
pub fn date_prefix(value: &str) -> &str {
    value.split(' ').next().unwrap_or(value)
}

/// Split an ISO-like `YYYY-MM-DD[ HH:MM:SS]` string into its components.
///
/// Components are returned verbatim, without validation of their ranges.
pub fn split_iso_date(value: &str) -> Option<(String, String, String)> {
    date_prefix(value)
        .split('-')
        .map(String::from)
        .collect_tuple()
}

/// Parse a date written day-first, falling back to ISO order.
///
/// Accepted forms: `26/08/2024`, `26-08-2024`, `26.08.2024`, `2024-08-26`,
/// each optionally followed by a time of day.
pub fn parse_day_first_date(value: &str) -> Option<NaiveDate> {
    let date = date_prefix(value.trim());

    if let Some(captures) = DAY_FIRST_REGEX.captures(date) {
        let day = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let year = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Split a delimiter-joined list, trimming entries and dropping empty ones.
///
/// # Arguments
///
/// * `value` - The joined string, e.g. "Univ X - Univ Y"
/// * `delimiter` - The separator; `None` keeps the value as a single entry
pub fn split_delimited(value: &str, delimiter: Option<&str>) -> Vec<String> {
    let parts: Vec<&str> = match delimiter {
        Some(delimiter) => value.split(delimiter).collect(),
        None => vec![value],
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Replace embedded line breaks with spaces and trim the result.
pub fn collapse_newlines(value: &str) -> String {
    NEWLINE_REGEX.replace_all(value, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Juan Pérez", Some(("Juan", "Pérez")))]
    #[case("Juan", Some(("Juan", "")))]
    #[case("Juan Carlos Pérez Gómez", Some(("Juan Carlos", "Pérez Gómez")))]
    #[case("  Ana   María  Ruiz ", Some(("Ana", "María Ruiz")))]
    #[case("María de la Cruz", Some(("María de", "la Cruz")))]
    #[case("   ", None)]
    fn test_split_full_name(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
        let actual = split_full_name(input);
        assert_eq!(
            actual.as_ref().map(|(f, l)| (f.as_str(), l.as_str())),
            expected
        );
    }

    #[rstest]
    #[case("2024-08-26 00:00:00", Some(("2024", "08", "26")))]
    #[case("2024-08-26", Some(("2024", "08", "26")))]
    #[case("2024/08/26", None)]
    #[case("2024-08", None)]
    #[case("2024-08-26-01", None)]
    fn test_split_iso_date(#[case] input: &str, #[case] expected: Option<(&str, &str, &str)>) {
        let actual = split_iso_date(input);
        assert_eq!(
            actual
                .as_ref()
                .map(|(y, m, d)| (y.as_str(), m.as_str(), d.as_str())),
            expected
        );
    }

    #[rstest]
    #[case("26/08/2024", Some((2024, 8, 26)))]
    #[case("3-2-2023", Some((2023, 2, 3)))]
    #[case("2024-08-26 00:00:00", Some((2024, 8, 26)))]
    #[case("31/02/2024", None)]
    #[case("agosto 2024", None)]
    fn test_parse_day_first_date(#[case] input: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_day_first_date(input), expected);
    }

    #[test]
    fn test_split_delimited() {
        assert_eq!(
            split_delimited("Univ X - Univ Y", Some(" - ")),
            vec!["Univ X", "Univ Y"]
        );
        assert_eq!(
            split_delimited("Univ X -  - Univ Y - ", Some(" - ")),
            vec!["Univ X", "Univ Y"]
        );
        assert_eq!(
            split_delimited(" Facultad de Ingeniería ", None),
            vec!["Facultad de Ingeniería"]
        );
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("NC2019\n0001234 "), "NC2019 0001234");
        assert_eq!(collapse_newlines("a\r\nb"), "a b");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(52.0), "52");
        assert_eq!(format_float(0.25), "0.25");
    }
}
