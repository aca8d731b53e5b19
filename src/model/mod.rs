mod business;
mod client;
mod invoice;

pub use business::{
    BusinessPatch, BusinessProfile, InvoiceSettings, LegalInfo, PaymentInfo,
};
pub use client::{Address, Client, ClientPatch, CompanyInfo, NewClient};
pub use invoice::{
    Invoice, InvoiceDates, InvoiceItem, InvoicePatch, InvoiceTemplate, InvoiceTotals, ItemPatch,
    NewItem, Status,
};
