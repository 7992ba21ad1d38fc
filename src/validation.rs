use std::fmt;

/// Fields that must be filled before an invoice can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    InvoiceNo,
    ReceiverName,
}

impl RequiredField {
    pub const ALL: [RequiredField; 2] = [RequiredField::InvoiceNo, RequiredField::ReceiverName];

    /// Inline message shown next to the field while it is invalid.
    pub fn message(self) -> &'static str {
        match self {
            RequiredField::InvoiceNo => "Invoice number is required",
            RequiredField::ReceiverName => "Name is required",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequiredField::InvoiceNo => "invoice number",
            RequiredField::ReceiverName => "receiver name",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchState {
    #[default]
    Untouched,
    Touched,
}

/// Touch tracking for the required fields. A field becomes touched when the
/// user leaves it or tries to export, and stays touched until reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Touched {
    invoice_no: TouchState,
    receiver_name: TouchState,
}

impl Touched {
    pub fn touch(&mut self, field: RequiredField) {
        *self.slot(field) = TouchState::Touched;
    }

    pub fn state(&self, field: RequiredField) -> TouchState {
        match field {
            RequiredField::InvoiceNo => self.invoice_no,
            RequiredField::ReceiverName => self.receiver_name,
        }
    }

    pub fn is_touched(&self, field: RequiredField) -> bool {
        self.state(field) == TouchState::Touched
    }

    fn slot(&mut self, field: RequiredField) -> &mut TouchState {
        match field {
            RequiredField::InvoiceNo => &mut self.invoice_no,
            RequiredField::ReceiverName => &mut self.receiver_name,
        }
    }
}

/// Whether a field should be flagged: touched and still blank.
pub fn is_invalid(state: TouchState, value: &str) -> bool {
    state == TouchState::Touched && value.trim().is_empty()
}
