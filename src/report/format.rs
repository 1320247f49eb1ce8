/// Group an unsigned run of digits in threes, e.g. "5148000" -> "5,148,000"
pub fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Split a fixed-point rendering of `value.abs()` into grouped whole part
/// and fraction. Works on the text, so magnitudes past i64 stay intact.
fn grouped_parts(value: f64, decimals: usize) -> (String, String) {
    let fixed = format!("{:.*}", decimals, value.abs());
    match fixed.split_once('.') {
        Some((whole, frac)) => (group_digits(whole), frac.to_string()),
        None => (group_digits(&fixed), String::new()),
    }
}

fn is_zero_text(whole: &str, frac: &str) -> bool {
    whole.chars().chain(frac.chars()).all(|c| c == '0' || c == ',')
}

/// Currency amount rounded to whole units, e.g. "₹5,148,000"
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let (whole, _) = grouped_parts(value, 0);
    if value < 0.0 && !is_zero_text(&whole, "") {
        format!("-{currency_symbol}{whole}")
    } else {
        format!("{currency_symbol}{whole}")
    }
}

/// Currency amount with two decimal places and thousands separators
pub fn format_amount(value: f64, currency_symbol: &str) -> String {
    let (whole, frac) = grouped_parts(value, 2);
    if value < 0.0 && !is_zero_text(&whole, &frac) {
        format!("-{currency_symbol}{whole}.{frac}")
    } else {
        format!("{currency_symbol}{whole}.{frac}")
    }
}

/// Grouped number with up to `max_decimals` places and no trailing zeros
pub fn format_decimal(value: f64, max_decimals: usize) -> String {
    let (whole, frac) = grouped_parts(value, max_decimals);
    let frac = frac.trim_end_matches('0');
    let sign = if value < 0.0 && !is_zero_text(&whole, frac) {
        "-"
    } else {
        ""
    };

    if frac.is_empty() {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{frac}")
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
