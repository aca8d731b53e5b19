mod typst;

pub use typst::{generate_invoice_pdf, generate_report_pdf};
