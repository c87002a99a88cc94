use super::types::Metric;

pub const UNDEFINED_DISPLAY: &str = "n/a";

pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return UNDEFINED_DISPLAY.to_string();
    }

    // Adding 0.0 folds -0 into 0 so a value rounding to zero prints unsigned.
    let rounded = amount.round() + 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits);
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return UNDEFINED_DISPLAY.to_string();
    }
    format!("{:.1}%", round_tenths(fraction * 100.0))
}

pub fn format_metric_currency(metric: Metric) -> String {
    metric
        .value()
        .map(format_currency)
        .unwrap_or_else(|| UNDEFINED_DISPLAY.to_string())
}

pub fn format_metric_percent(metric: Metric) -> String {
    metric
        .value()
        .map(format_percent)
        .unwrap_or_else(|| UNDEFINED_DISPLAY.to_string())
}

// ROI is already a whole percentage.
pub fn format_roi(metric: Metric) -> String {
    match metric {
        Metric::Defined(v) => format!("{}%", v + 0.0),
        Metric::Undefined => UNDEFINED_DISPLAY.to_string(),
    }
}

pub fn format_months(metric: Metric) -> String {
    match metric {
        Metric::Defined(v) if v == 1.0 => "1 month".to_string(),
        Metric::Defined(v) => format!("{} months", v + 0.0),
        Metric::Undefined => UNDEFINED_DISPLAY.to_string(),
    }
}

pub fn format_days(days: f64) -> String {
    format!("{:.1} days", round_tenths(days))
}

// `{:.1}` breaks exact ties to even; currency and percent both round halves
// away from zero.
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
