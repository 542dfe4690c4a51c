use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::acquire::DataRow;
use crate::error::{OverlayError, OverlayResult};

/// Fixed column positions of the quote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub value: usize,
    pub change: usize,
    pub time: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            value: 1,
            change: 3,
            time: 6,
        }
    }
}

/// Raw texts pulled from a matched row, before numeric normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub value: String,
    pub change: Option<String>,
    pub time: Option<String>,
}

/// Pulls value/change/time out of `row`.
///
/// Empty or absent columns fall back to the numeric tokens of the row text,
/// taken positionally (first = value, second = change). The maturity label is
/// removed first so its digits are never mistaken for a reading.
pub fn extract_fields(row: &DataRow, layout: ColumnLayout, label: &Regex) -> OverlayResult<RawFields> {
    let tokens = numeric_tokens(&row.text, label);

    let value = row
        .cell(layout.value)
        .map(str::to_owned)
        .or_else(|| tokens.first().cloned())
        .ok_or_else(|| OverlayError::ParseFailure("yield value not found in row".to_owned()))?;
    let change = row
        .cell(layout.change)
        .map(str::to_owned)
        .or_else(|| tokens.get(1).cloned());
    let time = row.cell(layout.time).map(str::to_owned);

    Ok(RawFields {
        value,
        change,
        time,
    })
}

/// Signed decimals (optionally suffixed with `%`) in `text`, label removed.
#[must_use]
pub fn numeric_tokens(text: &str, label: &Regex) -> Vec<String> {
    let unlabeled = label.replace_all(text, " ");
    number_pattern()
        .find_iter(&unlabeled)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Parses `4.23`, `4.23%`, `-0.02 %` or `+0.1` into a float.
pub fn parse_percent(text: &str) -> OverlayResult<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let value: f64 = cleaned
        .parse()
        .map_err(|e| OverlayError::ParseFailure(format!("`{text}` is not a number: {e}")))?;
    if !value.is_finite() {
        return Err(OverlayError::ParseFailure(format!("`{text}` is not a finite number")));
    }
    Ok(value)
}

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"[-+\u{2212}]?\d+(?:\.\d+)?%?").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::InstrumentProfile;

    fn label() -> Regex {
        InstrumentProfile::us_10y().label_regex().expect("label regex")
    }

    #[test]
    fn label_digits_are_not_tokens() {
        assert_eq!(
            numeric_tokens("US 10 Year 4.23% -0.02%", &label()),
            vec!["4.23%", "-0.02%"]
        );
    }

    #[test]
    fn percent_and_sign_forms_parse() {
        assert_eq!(parse_percent("4.23%").expect("value"), 4.23);
        assert_eq!(parse_percent(" -0.02 % ").expect("change"), -0.02);
        assert_eq!(parse_percent("+0.10").expect("plus"), 0.1);
        assert_eq!(parse_percent("\u{2212}1.5").expect("minus sign"), -1.5);
        assert!(parse_percent("n/a").is_err());
        assert!(parse_percent("NaN").is_err());
        assert!(parse_percent("").is_err());
    }

    #[test]
    fn columns_win_over_text_tokens() {
        let row = DataRow {
            cells: ["US10Y", "4.1850", "4.20", "0.0150%", "", "", "Oct/17"]
                .map(str::to_owned)
                .to_vec(),
            text: "US10Y 4.1850 4.20 0.0150% Oct/17".to_owned(),
        };
        let fields = extract_fields(&row, ColumnLayout::default(), &label()).expect("fields");
        assert_eq!(fields.value, "4.1850");
        assert_eq!(fields.change.as_deref(), Some("0.0150%"));
        assert_eq!(fields.time.as_deref(), Some("Oct/17"));
    }

    #[test]
    fn row_without_numbers_is_a_parse_failure() {
        let row = DataRow {
            cells: vec!["US 10 Year".to_owned()],
            text: "US 10 Year".to_owned(),
        };
        assert!(matches!(
            extract_fields(&row, ColumnLayout::default(), &label()),
            Err(OverlayError::ParseFailure(_))
        ));
    }
}
