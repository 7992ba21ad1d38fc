use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ExportError, FormError};
use crate::model::{ITEM_ROWS, InvoiceState, ItemField};
use crate::shops::ShopProfile;
use crate::totals::{TaxSummary, line_amount};
use crate::validation::{RequiredField, Touched, is_invalid};

/// The invoice being edited: field values plus touch tracking.
///
/// Every mutation is reflected immediately in [`InvoiceForm::summary`]; nothing
/// is cached.
#[derive(Debug, Clone)]
pub struct InvoiceForm {
    state: InvoiceState,
    touched: Touched,
}

impl InvoiceForm {
    pub fn new(shop: ShopProfile, date: NaiveDate) -> Self {
        Self {
            state: InvoiceState::new(shop, date),
            touched: Touched::default(),
        }
    }

    /// Opens a fresh form for the shop behind `route`.
    pub fn open(route: Option<&str>) -> Self {
        Self {
            state: InvoiceState::today(ShopProfile::for_route(route)),
            touched: Touched::default(),
        }
    }

    pub fn state(&self) -> &InvoiceState {
        &self.state
    }

    pub fn touched(&self) -> &Touched {
        &self.touched
    }

    pub fn set_invoice_no(&mut self, value: impl Into<String>) {
        self.state.invoice_no = value.into();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.state.date = date;
    }

    pub fn set_receiver_name(&mut self, value: impl Into<String>) {
        self.state.receiver.name = value.into();
    }

    pub fn set_receiver_address(&mut self, value: impl Into<String>) {
        self.state.receiver.address = value.into();
    }

    pub fn set_receiver_gstin(&mut self, value: impl Into<String>) {
        self.state.receiver.gstin = value.into();
    }

    pub fn set_vehicle_no(&mut self, value: impl Into<String>) {
        self.state.receiver.vehicle_no = value.into();
    }

    pub fn set_cgst_rate(&mut self, value: impl Into<String>) {
        self.state.cgst_rate = value.into();
    }

    pub fn set_sgst_rate(&mut self, value: impl Into<String>) {
        self.state.sgst_rate = value.into();
    }

    pub fn update_item(
        &mut self,
        index: usize,
        field: ItemField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let item = self
            .state
            .items
            .get_mut(index)
            .ok_or(FormError::NoSuchRow(index))?;
        *item.field_mut(field) = value.into();
        Ok(())
    }

    /// The user left a required field.
    pub fn blur(&mut self, field: RequiredField) {
        self.touched.touch(field);
    }

    pub fn value(&self, field: RequiredField) -> &str {
        match field {
            RequiredField::InvoiceNo => &self.state.invoice_no,
            RequiredField::ReceiverName => &self.state.receiver.name,
        }
    }

    pub fn is_invalid(&self, field: RequiredField) -> bool {
        is_invalid(self.touched.state(field), self.value(field))
    }

    /// Back to a blank invoice dated `today`, keeping the shop.
    pub fn reset(&mut self, today: NaiveDate) {
        let shop = self.state.shop.clone();
        *self = Self::new(shop, today);
    }

    pub fn summary(&self) -> TaxSummary {
        TaxSummary::for_invoice(&self.state)
    }

    pub fn line_amounts(&self) -> [f64; ITEM_ROWS] {
        std::array::from_fn(|i| line_amount(&self.state.items[i]))
    }

    /// Checks the required fields ahead of an export. Every blank field is
    /// marked touched so it shows its error.
    pub fn validate_for_export(&mut self) -> Result<(), ExportError> {
        let missing: Vec<RequiredField> = RequiredField::ALL
            .into_iter()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect();

        for field in &missing {
            self.touched.touch(*field);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            debug!(?missing, "export blocked by required fields");
            Err(ExportError::MissingFields(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> InvoiceForm {
        InvoiceForm::new(
            ShopProfile::for_route(None),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn edits_flow_into_totals() {
        let mut form = form();
        form.update_item(0, ItemField::Quantity, "2").unwrap();
        form.update_item(0, ItemField::Rate, "100").unwrap();
        assert_eq!(form.summary().grand_total, 236.0);

        form.update_item(11, ItemField::Quantity, "1").unwrap();
        form.update_item(11, ItemField::Rate, "0.5").unwrap();
        let summary = form.summary();
        assert_eq!(summary.subtotal, 200.5);
        assert_eq!(summary.grand_total, 237.0);
        assert_eq!(form.line_amounts()[11], 0.5);
    }

    #[test]
    fn rows_are_fixed() {
        let mut form = form();
        assert_eq!(
            form.update_item(ITEM_ROWS, ItemField::Rate, "1"),
            Err(FormError::NoSuchRow(ITEM_ROWS))
        );
        assert_eq!(form.state().items.len(), ITEM_ROWS);
    }

    #[test]
    fn blur_flags_blank_required_field() {
        let mut form = form();
        assert!(!form.is_invalid(RequiredField::ReceiverName));
        form.blur(RequiredField::ReceiverName);
        assert!(form.is_invalid(RequiredField::ReceiverName));
        form.set_receiver_name("Raj Kumar");
        assert!(!form.is_invalid(RequiredField::ReceiverName));
        // default invoice number "1" is never invalid
        form.blur(RequiredField::InvoiceNo);
        assert!(!form.is_invalid(RequiredField::InvoiceNo));
    }

    #[test]
    fn export_validation_touches_every_missing_field() {
        let mut form = form();
        form.set_invoice_no("  ");
        let err = form.validate_for_export().unwrap_err();
        match err {
            ExportError::MissingFields(fields) => {
                assert_eq!(fields, vec![RequiredField::InvoiceNo, RequiredField::ReceiverName])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(form.touched().is_touched(RequiredField::InvoiceNo));
        assert!(form.touched().is_touched(RequiredField::ReceiverName));
    }

    #[test]
    fn valid_form_passes() {
        let mut form = form();
        form.set_receiver_name("Raj Kumar");
        assert!(form.validate_for_export().is_ok());
        assert!(!form.touched().is_touched(RequiredField::ReceiverName));
    }

    #[test]
    fn open_starts_blank_for_the_routed_shop() {
        let form = InvoiceForm::open(Some("new-calcutta-motors"));
        let state = form.state();
        assert_eq!(state.shop, ShopProfile::for_route(Some("new-calcutta-motors")));
        assert_eq!(state, &InvoiceState::new(state.shop.clone(), state.date));
        assert_eq!(form.touched(), &Touched::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut form = InvoiceForm::new(
            ShopProfile::for_route(Some("new-calcutta-motors")),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        );
        form.set_invoice_no("A-12");
        form.set_cgst_rate("14");
        form.set_vehicle_no("UP53 AB 1234");
        form.update_item(3, ItemField::Description, "Brake pad").unwrap();
        form.blur(RequiredField::ReceiverName);

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        form.reset(today);

        let fresh = InvoiceState::new(ShopProfile::for_route(Some("new-calcutta-motors")), today);
        assert_eq!(form.state(), &fresh);
        assert_eq!(form.touched(), &Touched::default());
    }
}
