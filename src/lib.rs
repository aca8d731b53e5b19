pub mod document;
pub mod error;
pub mod model;
pub mod pdf;
pub mod store;

pub use error::{FactureError, Result};
pub use model::{
    BusinessPatch, BusinessProfile, Client, ClientPatch, Invoice, InvoiceItem, InvoicePatch,
    InvoiceTemplate, InvoiceTotals, ItemPatch, NewClient, NewItem, Status,
};
pub use store::{compute_totals, StateStore, StateTree, Store, TomlStateStore};
