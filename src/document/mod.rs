mod report;

pub use report::{ReportData, ReportRow};

use serde::Serialize;

use crate::model::{BusinessProfile, Client, Invoice, InvoiceTemplate};

/// Business identity block as it appears on a document
#[derive(Debug, Serialize)]
pub struct BusinessBlock {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal: String,
    pub country: String,
    pub siret: String,
    pub vat_number: String,
    pub rcs: String,
}

impl BusinessBlock {
    pub fn from_profile(business: &BusinessProfile) -> Self {
        Self {
            name: business.name.clone(),
            email: business.email.clone(),
            phone: business.phone.clone(),
            street: business.address.street.clone(),
            city: business.address.city.clone(),
            postal: business.address.postal.clone(),
            country: business.address.country.clone(),
            siret: business.legal.siret.clone(),
            vat_number: business.legal.vat_number.clone(),
            rcs: business.legal.rcs.clone(),
        }
    }
}

/// Bill-to block as it appears on a document
#[derive(Debug, Serialize)]
pub struct ClientBlock {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal: String,
    pub country: String,
    pub company_name: String,
    pub vat_number: String,
}

impl ClientBlock {
    pub fn from_client(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            street: client.address.street.clone(),
            city: client.address.city.clone(),
            postal: client.address.postal.clone(),
            country: client.address.country.clone(),
            company_name: client.company.name.clone(),
            vat_number: client.company.vat_number.clone(),
        }
    }
}

/// A rendered line on the invoice
#[derive(Debug, Serialize)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub vat_rate: f64,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct PaymentBlock {
    pub iban: String,
    pub bic: String,
    pub paypal_email: String,
}

/// Complete invoice data handed to the PDF layer. Totals and line amounts
/// are copied from the stored invoice as-is; the renderer never recomputes
/// them, so any mismatch between document and store is an engine defect.
#[derive(Debug, Serialize)]
pub struct InvoiceDocument {
    pub number: String,
    pub status: String,
    pub date: String,
    pub due_date: String,
    pub paid_date: Option<String>,
    pub template: String,
    pub notes: String,
    pub payment_terms: String,
    pub currency_symbol: String,
    pub business: BusinessBlock,
    pub client: ClientBlock,
    pub payment: PaymentBlock,
    pub items: Vec<DocumentLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub vat_amount: f64,
    pub total: f64,
}

impl InvoiceDocument {
    pub fn assemble(
        invoice: &Invoice,
        client: &Client,
        business: &BusinessProfile,
        template: InvoiceTemplate,
    ) -> Self {
        let items = invoice
            .items
            .iter()
            .map(|i| DocumentLine {
                description: i.description.clone(),
                quantity: i.quantity,
                unit_price: i.unit_price,
                vat_rate: i.vat_rate,
                amount: i.total,
            })
            .collect();

        Self {
            number: invoice.number.clone(),
            status: invoice.status.to_string(),
            date: invoice.dates.created.format("%B %d, %Y").to_string(),
            due_date: invoice.dates.due.format("%B %d, %Y").to_string(),
            paid_date: invoice
                .dates
                .paid
                .map(|d| d.format("%B %d, %Y").to_string()),
            template: template.to_string(),
            notes: invoice.notes.clone(),
            payment_terms: format!("Net {} days", invoice.payment_terms),
            currency_symbol: business.invoice_settings.currency_symbol.clone(),
            business: BusinessBlock::from_profile(business),
            client: ClientBlock::from_client(client),
            payment: PaymentBlock {
                iban: business.payment_info.iban.clone(),
                bic: business.payment_info.bic.clone(),
                paypal_email: business.payment_info.paypal_email.clone(),
            },
            items,
            subtotal: invoice.totals.subtotal,
            discount: invoice.totals.discount,
            vat_amount: invoice.totals.vat_amount,
            total: invoice.totals.total,
        }
    }
}
