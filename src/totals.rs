//! Line amounts and the CGST/SGST/IGST reconciliation.
//!
//! CGST and SGST are percentages of the subtotal. IGST is not a rate at all:
//! it is whatever is left between the taxed amount and the next whole rupee,
//! so the grand total always comes out integral.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{InvoiceState, LineItem};
use crate::words::amount_in_words;

static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Reads a number the way a lenient form does: grouping commas are dropped,
/// the longest leading decimal literal wins, and anything unreadable is `0.0`.
pub fn parse_number(text: &str) -> f64 {
    let cleaned = text.replace(',', "");
    NUMBER_PREFIX
        .find(cleaned.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

pub fn line_amount(item: &LineItem) -> f64 {
    parse_number(&item.quantity) * parse_number(&item.rate)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    pub subtotal: f64,
    pub cgst_amount: f64,
    pub sgst_amount: f64,
    pub igst_amount: f64,
    pub grand_total: f64,
    pub amount_in_words: String,
}

impl TaxSummary {
    /// Reconciles a subtotal against the two percentage rates.
    pub fn from_subtotal(subtotal: f64, cgst_percent: f64, sgst_percent: f64) -> Self {
        let cgst_amount = subtotal * cgst_percent / 100.0;
        let sgst_amount = subtotal * sgst_percent / 100.0;

        let pre_igst = subtotal + cgst_amount + sgst_amount;
        let grand_total = pre_igst.ceil();
        let igst_amount = grand_total - pre_igst;

        Self {
            subtotal,
            cgst_amount,
            sgst_amount,
            igst_amount,
            grand_total,
            // Totals below zero only arise from negative quantities typed by hand.
            amount_in_words: amount_in_words(grand_total.max(0.0)),
        }
    }

    pub fn for_invoice(state: &InvoiceState) -> Self {
        let subtotal = state.items.iter().map(line_amount).sum();
        Self::from_subtotal(
            subtotal,
            parse_number(&state.cgst_rate),
            parse_number(&state.sgst_rate),
        )
    }

    pub fn pre_igst_total(&self) -> f64 {
        self.subtotal + self.cgst_amount + self.sgst_amount
    }
}
