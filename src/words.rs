//! Amounts in words on the Indian numbering scale.

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen",
    "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Renders an amount in words, e.g. `295.0` -> `"Two Hundred Ninety Five only"`.
///
/// The amount is rounded to the nearest whole rupee first. Negative and
/// non-finite input is outside the domain and reads as zero.
pub fn amount_in_words(amount: f64) -> String {
    let whole = if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    };

    if whole == 0 {
        return "Zero only".to_string();
    }

    format!("{} only", capitalize(&spell(whole)))
}

fn spell(n: u64) -> String {
    if n >= CRORE {
        scaled(n, CRORE, "Crore", true)
    } else if n >= LAKH {
        scaled(n, LAKH, "Lakh", true)
    } else if n >= THOUSAND {
        scaled(n, THOUSAND, "Thousand", false)
    } else {
        hundreds(n)
    }
}

// Group counts above 999 crore are spelled on the same scale ("One Thousand Crores").
fn scaled(n: u64, unit: u64, word: &str, plural: bool) -> String {
    let count = n / unit;
    let rest = n % unit;

    let mut out = format!("{} {}", spell(count), word);
    if plural && count > 1 {
        out.push('s');
    }
    if rest > 0 {
        out.push(' ');
        out.push_str(&spell(rest));
    }
    out
}

fn hundreds(n: u64) -> String {
    let mut parts = Vec::with_capacity(3);
    let mut rest = n;

    if rest >= 100 {
        parts.push(format!("{} Hundred", ONES[(rest / 100) as usize]));
        rest %= 100;
    }
    if rest >= 20 {
        parts.push(TENS[(rest / 10) as usize].to_string());
        rest %= 10;
    }
    if rest > 0 {
        parts.push(ONES[rest as usize].to_string());
    }
    parts.join(" ")
}

fn capitalize(words: &str) -> String {
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
