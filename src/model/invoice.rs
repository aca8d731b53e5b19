use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FactureError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl Status {
    /// Forward-only transition table. Anything not listed here is rejected.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Draft, Status::Sent)
                | (Status::Sent, Status::Paid)
                | (Status::Sent, Status::Overdue)
                | (Status::Overdue, Status::Paid)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Draft => "draft",
            Status::Sent => "sent",
            Status::Paid => "paid",
            Status::Overdue => "overdue",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Status {
    type Err = FactureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "sent" => Ok(Status::Sent),
            "paid" => Ok(Status::Paid),
            "overdue" => Ok(Status::Overdue),
            _ => Err(FactureError::InvalidStatus(s.to_string())),
        }
    }
}

/// Visual layout variant for document rendering; never affects totals
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceTemplate {
    #[default]
    Classic,
    Modern,
    Corporate,
    Creative,
    Minimal,
}

impl fmt::Display for InvoiceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceTemplate::Classic => "classic",
            InvoiceTemplate::Modern => "modern",
            InvoiceTemplate::Corporate => "corporate",
            InvoiceTemplate::Creative => "creative",
            InvoiceTemplate::Minimal => "minimal",
        };
        write!(f, "{s}")
    }
}

impl FromStr for InvoiceTemplate {
    type Err = FactureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(InvoiceTemplate::Classic),
            "modern" => Ok(InvoiceTemplate::Modern),
            "corporate" => Ok(InvoiceTemplate::Corporate),
            "creative" => Ok(InvoiceTemplate::Creative),
            "minimal" => Ok(InvoiceTemplate::Minimal),
            _ => Err(FactureError::InvalidTemplate(s.to_string())),
        }
    }
}

/// A line on an invoice. `total` is always `quantity * unit_price`,
/// recomputed by the store on every mutation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub vat_rate: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub vat_amount: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceDates {
    pub created: DateTime<Utc>,
    pub due: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub status: Status,
    pub template: InvoiceTemplate,
    #[serde(default)]
    pub notes: String,
    /// Snapshot of the client's terms at creation time; not re-synced
    pub payment_terms: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dates: InvoiceDates,
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Status as shown in listings: a sent invoice past its due date reads
    /// as overdue without the stored status changing.
    pub fn display_status(&self, today: NaiveDate) -> Status {
        if self.status == Status::Sent && self.dates.due.date_naive() < today {
            Status::Overdue
        } else {
            self.status
        }
    }
}

/// Input for adding a line item; the store assigns the id and total
#[derive(Debug, Clone)]
pub struct NewItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub vat_rate: f64,
}

/// Partial line-item update; None fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub vat_rate: Option<f64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
            && self.vat_rate.is_none()
    }
}

/// Partial invoice update (metadata only; items go through the item ops)
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub notes: Option<String>,
    pub template: Option<InvoiceTemplate>,
}
