use serde::{Deserialize, Serialize};

use crate::model::{BusinessProfile, Client, Invoice, InvoiceTemplate};

/// Monotonic invoice issue counter. Persisted so that deleting an invoice
/// can never cause a number to be reused.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub struct SequenceCounter {
    pub issued: u64,
}

/// The complete persisted snapshot: everything the application knows is
/// written and reloaded as one blob.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StateTree {
    #[serde(default)]
    pub active_template: InvoiceTemplate,
    #[serde(default)]
    pub counter: SequenceCounter,
    #[serde(default)]
    pub business: BusinessProfile,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl StateTree {
    /// State trees written before the counter existed carry issued = 0;
    /// raise it so numbering stays ahead of every stored invoice.
    pub fn reconcile(&mut self) {
        let count = self.invoices.len() as u64;
        if self.counter.issued < count {
            self.counter.issued = count;
        }
    }
}
