use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::shops::ShopProfile;

/// Number of rows on the printed invoice. The table never grows or shrinks.
pub const ITEM_ROWS: usize = 12;

pub const DEFAULT_INVOICE_NO: &str = "1";
pub const DEFAULT_TAX_RATE: &str = "9";

/// One row of the items table. Quantity and rate stay as typed so that
/// partially entered numbers ("1,2", "3.") survive editing.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub hsn_sac: String,
    pub quantity: String,
    pub rate: String,
}

/// Editable columns of a [`LineItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    HsnSac,
    Quantity,
    Rate,
}

impl LineItem {
    pub fn new(description: &str, hsn_sac: &str, quantity: &str, rate: &str) -> Self {
        Self {
            description: description.to_string(),
            hsn_sac: hsn_sac.to_string(),
            quantity: quantity.to_string(),
            rate: rate.to_string(),
        }
    }

    pub fn field_mut(&mut self, field: ItemField) -> &mut String {
        match field {
            ItemField::Description => &mut self.description,
            ItemField::HsnSac => &mut self.hsn_sac,
            ItemField::Quantity => &mut self.quantity,
            ItemField::Rate => &mut self.rate,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
            && self.hsn_sac.trim().is_empty()
            && self.quantity.trim().is_empty()
            && self.rate.trim().is_empty()
    }
}

/// "Details of receiver, billed to".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Receiver {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub vehicle_no: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceState {
    pub items: [LineItem; ITEM_ROWS],
    pub cgst_rate: String,
    pub sgst_rate: String,
    pub date: NaiveDate,
    pub invoice_no: String,
    pub receiver: Receiver,
    pub shop: ShopProfile,
}

impl InvoiceState {
    /// A blank invoice dated `date` for the given shop.
    pub fn new(shop: ShopProfile, date: NaiveDate) -> Self {
        Self {
            items: Default::default(),
            cgst_rate: DEFAULT_TAX_RATE.to_string(),
            sgst_rate: DEFAULT_TAX_RATE.to_string(),
            date,
            invoice_no: DEFAULT_INVOICE_NO.to_string(),
            receiver: Receiver::default(),
            shop,
        }
    }

    /// A blank invoice dated today.
    pub fn today(shop: ShopProfile) -> Self {
        Self::new(shop, Local::now().date_naive())
    }

    /// Date as an input control holds it.
    pub fn date_input(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
