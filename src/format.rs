//! Display formatting for outputs

use crate::formula::OutputValue;

/// How an output is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Currency,
    /// Value already expressed in percent
    Percent,
    Years,
    Months,
    Plain,
}

impl Style {
    /// Infer a style from the naming conventions of output ids
    pub fn for_output(id: &str) -> Self {
        if id.ends_with("_pct") || id.ends_with("_rate") {
            Style::Percent
        } else if id.ends_with("_months") || id == "periods" {
            Style::Months
        } else if id.contains("year") || id.ends_with("_age") {
            Style::Years
        } else if id.ends_with("coefficient") {
            Style::Plain
        } else {
            Style::Currency
        }
    }
}

/// Two decimals with thousands separators
pub fn currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Whole durations print without decimals, fractional ones with one
pub fn duration(value: f64, unit: &str) -> String {
    let amount = if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round())
    } else {
        format!("{:.1}", value)
    };
    let plural = if (value - 1.0).abs() < 1e-9 { "" } else { "s" };
    format!("{} {}{}", amount, unit, plural)
}

pub fn output(value: OutputValue, style: Style) -> String {
    match value {
        OutputValue::Never => "never".to_string(),
        OutputValue::NotApplicable => "n/a".to_string(),
        OutputValue::Number(n) => match style {
            Style::Currency => currency(n),
            Style::Percent => percent(n),
            Style::Years => duration(n, "year"),
            Style::Months => duration(n, "month"),
            Style::Plain => format!("{}", n),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(currency(0.0), "0.00");
        assert_eq!(currency(999.994), "999.99");
        assert_eq!(currency(1_000.0), "1,000.00");
        assert_eq!(currency(27_280.75), "27,280.75");
        assert_eq!(currency(1_234_567.891), "1,234,567.89");
        assert_eq!(currency(-4_221.5), "-4,221.50");
        assert_eq!(currency(-0.001), "0.00");
    }

    #[test]
    fn test_durations() {
        assert_eq!(duration(18.0, "year"), "18 years");
        assert_eq!(duration(1.0, "year"), "1 year");
        assert_eq!(duration(7.0588, "year"), "7.1 years");
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(output(OutputValue::Never, Style::Years), "never");
        assert_eq!(output(OutputValue::NotApplicable, Style::Percent), "n/a");
    }

    #[test]
    fn test_style_inference() {
        assert_eq!(Style::for_output("registration_rate"), Style::Percent);
        assert_eq!(Style::for_output("progress_pct"), Style::Percent);
        assert_eq!(Style::for_output("payoff_months"), Style::Months);
        assert_eq!(Style::for_output("years_to_fi"), Style::Years);
        assert_eq!(Style::for_output("retirement_age"), Style::Years);
        assert_eq!(Style::for_output("depreciation_coefficient"), Style::Plain);
        assert_eq!(Style::for_output("total"), Style::Currency);
    }
}
