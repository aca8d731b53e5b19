use std::path::PathBuf;
use thiserror::Error;

use crate::model::Status;

#[derive(Error, Debug)]
pub enum FactureError {
    #[error("Data directory not found at {0}. Run 'facture init' to create it.")]
    NotInitialized(PathBuf),

    #[error("Data directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to parse state file {path}: {source}")]
    StateParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize state: {0}")]
    StateSerialize(#[from] toml::ser::Error),

    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invoice {invoice} has no item {item}")]
    ItemNotFound { invoice: String, item: String },

    #[error("Invalid invoice index '{0}'. Use 'facture list' to see available invoices.")]
    InvalidInvoiceRef(String),

    #[error("Invalid item index '{0}'. Use 'facture show' to see the invoice's items.")]
    InvalidItemRef(String),

    #[error("Cannot delete client '{name}': {count} invoice(s) still reference it")]
    ClientInUse { name: String, count: usize },

    #[error("Cannot change invoice status from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Invalid VAT rate {rate}%. Allowed rates: {allowed}")]
    InvalidVatRate { rate: f64, allowed: String },

    #[error("Invalid status '{0}'. Use 'draft', 'sent', 'paid', or 'overdue'.")]
    InvalidStatus(String),

    #[error("Invalid template '{0}'. Use 'classic', 'modern', 'corporate', 'creative', or 'minimal'.")]
    InvalidTemplate(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Invoice file not found: {0}")]
    InvoiceFileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FactureError>;
