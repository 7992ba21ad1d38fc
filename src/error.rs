//! Error types for the invoice form and the export pipeline

use thiserror::Error;

use crate::model::ITEM_ROWS;
use crate::validation::RequiredField;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Row {0} does not exist (the invoice has {rows} rows)", rows = ITEM_ROWS)]
    NoSuchRow(usize),
}

/// Failures of the external renderer: capturing the view or writing the page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("typst exited with {status}: {stderr}")]
    Typst { status: String, stderr: String },

    #[error("Snapshot could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Required fields were blank; they have been marked touched.
    #[error("Please fill in the {} field(s) before generating the PDF", join(.0))]
    MissingFields(Vec<RequiredField>),

    #[error("An export is already in progress")]
    InProgress,

    #[error("Snapshot is empty")]
    EmptySnapshot,

    #[error(transparent)]
    Render(#[from] RenderError),
}

fn join(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_names_them() {
        let err =
            ExportError::MissingFields(vec![RequiredField::InvoiceNo, RequiredField::ReceiverName]);
        assert_eq!(
            err.to_string(),
            "Please fill in the invoice number and receiver name field(s) before generating the PDF"
        );
    }

    #[test]
    fn row_error_mentions_table_size() {
        assert_eq!(
            FormError::NoSuchRow(12).to_string(),
            "Row 12 does not exist (the invoice has 12 rows)"
        );
    }
}
