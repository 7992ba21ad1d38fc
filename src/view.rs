//! The rendered invoice document.
//!
//! An [`InvoiceView`] is what the user is looking at: live input controls
//! carrying the current values, the action bar, and the derived amounts as
//! they are displayed. Export never looks at the form directly; it captures
//! the view, switched into presentation mode for the duration.

use std::ops::Deref;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::form::InvoiceForm;
use crate::format::{display_date, format_amount};
use crate::shops::ShopProfile;
use crate::validation::RequiredField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Date,
    Number,
}

/// An input control in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub kind: ControlKind,
    pub value: String,
    pub placeholder: &'static str,
    pub invalid: bool,
    /// Set while the control is swapped out for `static_text`.
    pub hidden: bool,
    pub static_text: Option<String>,
}

impl Control {
    fn new(kind: ControlKind, value: &str, placeholder: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            placeholder,
            invalid: false,
            hidden: false,
            static_text: None,
        }
    }

    fn text(value: &str, placeholder: &'static str) -> Self {
        Self::new(ControlKind::Text, value, placeholder)
    }

    fn flagged(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    /// True while the control accepts input.
    pub fn is_live(&self) -> bool {
        !self.hidden && self.static_text.is_none()
    }

    fn substitute(&mut self) {
        let value = self.value.trim();
        let text = match self.kind {
            ControlKind::Date if !value.is_empty() => display_date(value),
            _ => value.to_string(),
        };
        self.static_text = Some(text);
        self.hidden = true;
    }
}

// The renderer only needs to know what to draw, not how the control works.
impl Serialize for Control {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (display, ghost, boxed) = match &self.static_text {
            Some(text) => (text.as_str(), false, false),
            None if self.value.is_empty() => (self.placeholder, true, true),
            None => (self.value.as_str(), false, true),
        };
        let mut s = serializer.serialize_struct("Control", 4)?;
        s.serialize_field("display", display)?;
        s.serialize_field("ghost", &ghost)?;
        s.serialize_field("boxed", &boxed)?;
        s.serialize_field("invalid", &self.invalid)?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub description: Control,
    pub hsn_sac: Control,
    pub quantity: Control,
    pub rate: Control,
    /// Blank for rows without a positive amount.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsView {
    pub before_tax: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub after_tax: String,
    pub in_words: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceView {
    pub actions_visible: bool,
    pub presenting: bool,
    pub shop: ShopProfile,
    pub phone_line: String,
    pub invoice_no: Control,
    pub invoice_no_error: Option<&'static str>,
    pub date: Control,
    pub receiver_name: Control,
    pub receiver_name_error: Option<&'static str>,
    pub receiver_address: Control,
    pub receiver_gstin: Control,
    pub vehicle_no: Control,
    pub rows: Vec<RowView>,
    pub cgst: Control,
    pub sgst: Control,
    pub totals: TotalsView,
}

impl InvoiceView {
    /// Renders the form as it currently stands.
    pub fn render(form: &InvoiceForm) -> Self {
        let state = form.state();
        let summary = form.summary();
        let amounts = form.line_amounts();

        let error = |field: RequiredField| form.is_invalid(field).then(|| field.message());

        let rows = state
            .items
            .iter()
            .zip(amounts)
            .map(|(item, amount)| RowView {
                description: Control::text(&item.description, "Enter item name"),
                hsn_sac: Control::text(&item.hsn_sac, "HSN/SAC"),
                quantity: Control::text(&item.quantity, "Qty"),
                rate: Control::text(&item.rate, "Rate"),
                amount: if amount > 0.0 { format_amount(amount) } else { String::new() },
            })
            .collect();

        Self {
            actions_visible: true,
            presenting: false,
            shop: state.shop.clone(),
            phone_line: state.shop.phone_line(),
            invoice_no: Control::text(&state.invoice_no, "Enter invoice number")
                .flagged(form.is_invalid(RequiredField::InvoiceNo)),
            invoice_no_error: error(RequiredField::InvoiceNo),
            date: Control::new(ControlKind::Date, &state.date_input(), ""),
            receiver_name: Control::text(&state.receiver.name, "Enter receiver name")
                .flagged(form.is_invalid(RequiredField::ReceiverName)),
            receiver_name_error: error(RequiredField::ReceiverName),
            receiver_address: Control::text(&state.receiver.address, "Enter address"),
            receiver_gstin: Control::text(&state.receiver.gstin, "Enter GSTIN/UIN"),
            vehicle_no: Control::text(&state.receiver.vehicle_no, "Enter vehicle number"),
            rows,
            cgst: Control::new(ControlKind::Number, &state.cgst_rate, ""),
            sgst: Control::new(ControlKind::Number, &state.sgst_rate, ""),
            totals: TotalsView {
                before_tax: format_amount(summary.subtotal),
                cgst: format_amount(summary.cgst_amount),
                sgst: format_amount(summary.sgst_amount),
                igst: format_amount(summary.igst_amount),
                after_tax: format_amount(summary.grand_total),
                in_words: summary.amount_in_words,
            },
        }
    }

    pub fn controls(&self) -> Vec<&Control> {
        let mut controls = vec![
            &self.invoice_no,
            &self.date,
            &self.receiver_name,
            &self.receiver_address,
            &self.receiver_gstin,
            &self.vehicle_no,
            &self.cgst,
            &self.sgst,
        ];
        for row in &self.rows {
            controls.extend([&row.description, &row.hsn_sac, &row.quantity, &row.rate]);
        }
        controls
    }

    fn controls_mut(&mut self) -> Vec<&mut Control> {
        let mut controls = vec![
            &mut self.invoice_no,
            &mut self.date,
            &mut self.receiver_name,
            &mut self.receiver_address,
            &mut self.receiver_gstin,
            &mut self.vehicle_no,
            &mut self.cgst,
            &mut self.sgst,
        ];
        for row in &mut self.rows {
            controls.extend([
                &mut row.description,
                &mut row.hsn_sac,
                &mut row.quantity,
                &mut row.rate,
            ]);
        }
        controls
    }

    /// True when the document is interactive: chrome shown, every control live.
    pub fn is_interactive(&self) -> bool {
        self.actions_visible && !self.presenting && self.controls().iter().all(|c| c.is_live())
    }

    /// Switches into presentation mode until the returned guard is dropped.
    ///
    /// The action bar is hidden and each control is replaced by static text
    /// of its trimmed value (dates read day first). Dropping the guard puts
    /// back exactly what was there before, whichever way the scope is left.
    pub fn present(&mut self) -> Presentation<'_> {
        let saved = Saved {
            actions_visible: self.actions_visible,
            presenting: self.presenting,
            controls: self
                .controls()
                .into_iter()
                .map(|c| (c.hidden, c.static_text.clone()))
                .collect(),
        };

        self.actions_visible = false;
        self.presenting = true;
        for control in self.controls_mut() {
            control.substitute();
        }

        Presentation { view: self, saved }
    }
}

struct Saved {
    actions_visible: bool,
    presenting: bool,
    controls: Vec<(bool, Option<String>)>,
}

/// Guard returned by [`InvoiceView::present`].
pub struct Presentation<'a> {
    view: &'a mut InvoiceView,
    saved: Saved,
}

impl Deref for Presentation<'_> {
    type Target = InvoiceView;

    fn deref(&self) -> &InvoiceView {
        self.view
    }
}

impl Drop for Presentation<'_> {
    fn drop(&mut self) {
        self.view.actions_visible = self.saved.actions_visible;
        self.view.presenting = self.saved.presenting;
        let saved = std::mem::take(&mut self.saved.controls);
        for (control, (hidden, static_text)) in self.view.controls_mut().into_iter().zip(saved) {
            control.hidden = hidden;
            control.static_text = static_text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemField;
    use chrono::NaiveDate;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn form() -> InvoiceForm {
        let mut form = InvoiceForm::new(
            ShopProfile::for_route(None),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        form.set_receiver_name("  Raj Kumar ");
        form.update_item(0, ItemField::Quantity, "2").unwrap();
        form.update_item(0, ItemField::Rate, "1,00,000").unwrap();
        form
    }

    #[test]
    fn renders_amounts_and_words() {
        let view = InvoiceView::render(&form());
        assert_eq!(view.rows.len(), 12);
        assert_eq!(view.rows[0].amount, "2,00,000.00");
        assert_eq!(view.rows[1].amount, "");
        assert_eq!(view.totals.before_tax, "2,00,000.00");
        assert_eq!(view.totals.cgst, "18,000.00");
        assert_eq!(view.totals.after_tax, "2,36,000.00");
        assert_eq!(view.totals.in_words, "Two Lakhs Thirty Six Thousand only");
        assert_eq!(view.phone_line, "9415280266, 9935922535, 8840958369");
        assert!(view.is_interactive());
    }

    #[test]
    fn invalid_fields_carry_their_message() {
        let mut form = form();
        form.set_invoice_no("");
        form.blur(RequiredField::InvoiceNo);
        let view = InvoiceView::render(&form);
        assert!(view.invoice_no.invalid);
        assert_eq!(view.invoice_no_error, Some("Invoice number is required"));
        assert_eq!(view.receiver_name_error, None);
    }

    #[test]
    fn presentation_swaps_controls_for_text() {
        let mut view = InvoiceView::render(&form());
        {
            let shown = view.present();
            assert!(!shown.actions_visible);
            assert!(shown.controls().iter().all(|c| !c.is_live()));
            assert_eq!(shown.date.static_text.as_deref(), Some("19-10-2026"));
            assert_eq!(shown.receiver_name.static_text.as_deref(), Some("Raj Kumar"));
            // empty controls show nothing, not their placeholder
            assert_eq!(shown.vehicle_no.static_text.as_deref(), Some(""));
            let ctx = serde_json::to_value(&*shown).unwrap();
            assert_eq!(ctx["vehicle_no"]["display"], "");
            assert_eq!(ctx["vehicle_no"]["ghost"], false);
        }
        assert!(view.is_interactive());
        assert_eq!(view, InvoiceView::render(&form()));
    }

    #[test]
    fn live_empty_control_shows_placeholder() {
        let view = InvoiceView::render(&form());
        let ctx = serde_json::to_value(&view).unwrap();
        assert_eq!(ctx["vehicle_no"]["display"], "Enter vehicle number");
        assert_eq!(ctx["vehicle_no"]["ghost"], true);
        assert_eq!(ctx["receiver_name"]["display"], "  Raj Kumar ");
    }

    #[test]
    fn restores_when_scope_unwinds() {
        let mut view = InvoiceView::render(&form());
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _shown = view.present();
            panic!("capture blew up");
        }));
        assert!(result.is_err());
        assert!(view.is_interactive());
        assert!(view.date.static_text.is_none());
    }
}
