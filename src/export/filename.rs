use std::sync::LazyLock;

use regex::Regex;

static NOT_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid filename pattern"));

const PREFIX_CHARS: usize = 10;

/// `<first 10 chars of name>_<invoice no>.pdf`, with every character that is
/// not an ASCII letter or digit turned into `_`.
pub fn export_filename(receiver_name: &str, invoice_no: &str) -> String {
    let head: String = receiver_name.trim().chars().take(PREFIX_CHARS).collect();
    let prefix = NOT_ALNUM.replace_all(&head, "_");
    let prefix = if prefix.is_empty() { "Invoice" } else { prefix.as_ref() };

    let number = NOT_ALNUM.replace_all(invoice_no.trim(), "_");
    let number = if number.is_empty() { "1" } else { number.as_ref() };

    format!("{prefix}_{number}.pdf")
}
