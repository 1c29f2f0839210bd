//! pt-BR display formatting for the console dashboard: `.` groups
//! thousands, `,` marks decimals, currency carries the `R$` prefix.

pub fn format_brl(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    format!("R$ {},{}", group_thousands(int_part), frac_part)
}

pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
