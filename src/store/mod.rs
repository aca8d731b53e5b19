mod persist;
mod state;
mod totals;

pub use persist::{data_dir, StateStore, TomlStateStore, STATE_FILE};
pub use state::{SequenceCounter, StateTree};
pub use totals::{compute_totals, item_total};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{FactureError, Result};
use crate::model::{
    BusinessPatch, BusinessProfile, Client, ClientPatch, Invoice, InvoiceDates, InvoiceItem,
    InvoicePatch, InvoiceTemplate, InvoiceTotals, ItemPatch, NewClient, NewItem, Status,
};

/// The repository and computation engine. Holds the in-memory state tree
/// and a storage backend; every mutating operation runs to completion and
/// ends with a whole-tree save, so callers never observe stale totals or a
/// torn snapshot on disk.
pub struct Store<S: StateStore> {
    state: StateTree,
    backend: S,
}

impl<S: StateStore> Store<S> {
    /// Load persisted state, or start from defaults. A corrupt state file
    /// is reported on stderr and replaced with the default tree rather
    /// than aborting.
    pub fn open(backend: S) -> Self {
        let state = match backend.load() {
            Ok(Some(mut tree)) => {
                tree.reconcile();
                tree
            }
            Ok(None) => StateTree::default(),
            Err(e) => {
                eprintln!("Warning: {e}; starting from an empty state");
                StateTree::default()
            }
        };
        Self { state, backend }
    }

    /// Create and persist a fresh default state tree.
    pub fn init(backend: S) -> Result<Self> {
        let store = Self {
            state: StateTree::default(),
            backend,
        };
        store.persist()?;
        Ok(store)
    }

    fn persist(&self) -> Result<()> {
        self.backend.save(&self.state)
    }

    pub fn state(&self) -> &StateTree {
        &self.state
    }

    pub fn business(&self) -> &BusinessProfile {
        &self.state.business
    }

    pub fn active_template(&self) -> InvoiceTemplate {
        self.state.active_template
    }

    pub fn clients(&self) -> &[Client] {
        &self.state.clients
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.state.invoices
    }

    // --- Clients ---

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.state.clients.iter().find(|c| c.id == id)
    }

    pub fn add_client(&mut self, new: NewClient) -> Result<Uuid> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            payment_terms: new.payment_terms,
            created_at: now,
            updated_at: now,
            address: new.address,
            company: new.company,
        };
        let id = client.id;
        self.state.clients.push(client);
        self.persist()?;
        Ok(id)
    }

    pub fn update_client(&mut self, id: Uuid, patch: ClientPatch) -> Result<()> {
        let client = self
            .state
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FactureError::ClientNotFound(id.to_string()))?;
        patch.apply(client);
        client.updated_at = Utc::now();
        self.persist()
    }

    /// Refused while any invoice still references the client.
    pub fn remove_client(&mut self, id: Uuid) -> Result<()> {
        let client = self
            .client(id)
            .ok_or_else(|| FactureError::ClientNotFound(id.to_string()))?;
        let count = self
            .state
            .invoices
            .iter()
            .filter(|i| i.client_id == id)
            .count();
        if count > 0 {
            return Err(FactureError::ClientInUse {
                name: client.name.clone(),
                count,
            });
        }
        self.state.clients.retain(|c| c.id != id);
        self.persist()
    }

    // --- Numbering ---

    /// Preview of the next invoice number. The counter only advances when
    /// an invoice is actually created, and it never decreases, so numbers
    /// are unique even across deletions.
    pub fn next_invoice_number(&self) -> String {
        let settings = &self.state.business.invoice_settings;
        format!(
            "{}{}",
            settings.prefix,
            settings.start_number + self.state.counter.issued
        )
    }

    // --- Invoices ---

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.state.invoices.iter().find(|i| i.id == id)
    }

    fn invoice_mut(&mut self, id: Uuid) -> Result<&mut Invoice> {
        self.state
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| FactureError::InvoiceNotFound(id.to_string()))
    }

    /// Create a draft invoice for a client: empty items, zero totals, due
    /// date and payment terms taken from the client's terms at this moment.
    pub fn create_invoice(
        &mut self,
        client_id: Uuid,
        template: Option<InvoiceTemplate>,
        notes: String,
    ) -> Result<Uuid> {
        let client = self
            .client(client_id)
            .ok_or_else(|| FactureError::ClientNotFound(client_id.to_string()))?;
        let terms = client.payment_terms;

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            number: self.next_invoice_number(),
            client_id,
            status: Status::Draft,
            template: template.unwrap_or(self.state.active_template),
            notes,
            payment_terms: terms,
            created_at: now,
            updated_at: now,
            dates: InvoiceDates {
                created: now,
                due: now + Duration::days(terms as i64),
                paid: None,
            },
            totals: InvoiceTotals::default(),
            items: Vec::new(),
        };
        let id = invoice.id;
        self.state.invoices.push(invoice);
        self.state.counter.issued += 1;
        self.persist()?;
        Ok(id)
    }

    pub fn update_invoice(&mut self, id: Uuid, patch: InvoicePatch) -> Result<()> {
        let invoice = self.invoice_mut(id)?;
        if let Some(notes) = patch.notes {
            invoice.notes = notes;
        }
        if let Some(template) = patch.template {
            invoice.template = template;
        }
        invoice.updated_at = Utc::now();
        self.persist()
    }

    /// Unconditional; invoices never block their own deletion.
    pub fn remove_invoice(&mut self, id: Uuid) -> Result<()> {
        if self.invoice(id).is_none() {
            return Err(FactureError::InvoiceNotFound(id.to_string()));
        }
        self.state.invoices.retain(|i| i.id != id);
        self.persist()
    }

    /// Advance the lifecycle. Only the forward transitions in the table
    /// are allowed; entering `paid` stamps the paid date, and nothing else
    /// ever touches it. Totals are unaffected by status changes.
    pub fn set_status(&mut self, id: Uuid, next: Status) -> Result<()> {
        let invoice = self.invoice_mut(id)?;
        if !invoice.status.can_transition_to(next) {
            return Err(FactureError::InvalidTransition {
                from: invoice.status,
                to: next,
            });
        }
        invoice.status = next;
        if next == Status::Paid {
            invoice.dates.paid = Some(Utc::now());
        }
        invoice.updated_at = Utc::now();
        self.persist()
    }

    // --- Line items ---

    fn check_vat_rate(&self, rate: f64) -> Result<()> {
        let allowed = &self.state.business.invoice_settings.vat_rates;
        if allowed.iter().any(|r| (r - rate).abs() < 1e-9) {
            return Ok(());
        }
        Err(FactureError::InvalidVatRate {
            rate,
            allowed: allowed
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    pub fn add_item(&mut self, invoice_id: Uuid, new: NewItem) -> Result<Uuid> {
        self.check_vat_rate(new.vat_rate)?;
        let invoice = self.invoice_mut(invoice_id)?;

        let item = InvoiceItem {
            id: Uuid::new_v4(),
            description: new.description,
            quantity: new.quantity,
            unit_price: new.unit_price,
            vat_rate: new.vat_rate,
            total: item_total(new.quantity, new.unit_price),
        };
        let item_id = item.id;

        invoice.items.push(item);
        invoice.totals = compute_totals(&invoice.items);
        invoice.updated_at = Utc::now();
        self.persist()?;
        Ok(item_id)
    }

    pub fn update_item(&mut self, invoice_id: Uuid, item_id: Uuid, patch: ItemPatch) -> Result<()> {
        if let Some(rate) = patch.vat_rate {
            self.check_vat_rate(rate)?;
        }
        let invoice = self.invoice_mut(invoice_id)?;
        let number = invoice.number.clone();

        let item = invoice
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| FactureError::ItemNotFound {
                invoice: number,
                item: item_id.to_string(),
            })?;

        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = patch.unit_price {
            item.unit_price = price;
        }
        if let Some(rate) = patch.vat_rate {
            item.vat_rate = rate;
        }
        item.total = item_total(item.quantity, item.unit_price);

        invoice.totals = compute_totals(&invoice.items);
        invoice.updated_at = Utc::now();
        self.persist()
    }

    pub fn remove_item(&mut self, invoice_id: Uuid, item_id: Uuid) -> Result<()> {
        let invoice = self.invoice_mut(invoice_id)?;
        if !invoice.items.iter().any(|i| i.id == item_id) {
            return Err(FactureError::ItemNotFound {
                invoice: invoice.number.clone(),
                item: item_id.to_string(),
            });
        }
        invoice.items.retain(|i| i.id != item_id);
        invoice.totals = compute_totals(&invoice.items);
        invoice.updated_at = Utc::now();
        self.persist()
    }

    // --- Business profile & template ---

    pub fn update_business(&mut self, patch: BusinessPatch) -> Result<()> {
        patch.apply(&mut self.state.business);
        self.persist()
    }

    pub fn set_active_template(&mut self, template: InvoiceTemplate) -> Result<()> {
        self.state.active_template = template;
        self.persist()
    }
}
