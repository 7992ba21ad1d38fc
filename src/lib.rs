//! GST invoice engine: totals reconciliation, amounts in words on the Indian
//! scale, and one-page PDF export of the rendered invoice.

pub mod error;
pub mod export;
pub mod form;
pub mod format;
pub mod model;
pub mod shops;
pub mod totals;
pub mod validation;
pub mod view;
pub mod words;

pub use error::{ExportError, FormError, RenderError};
pub use export::{ExportCoordinator, ExportLayout, PageFormat};
pub use form::InvoiceForm;
pub use model::{ITEM_ROWS, InvoiceState, ItemField, LineItem, Receiver};
pub use shops::ShopProfile;
pub use totals::TaxSummary;
pub use view::InvoiceView;
