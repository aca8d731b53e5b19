use tempfile::TempDir;

use facture::error::FactureError;
use facture::model::{Address, ClientPatch, CompanyInfo, ItemPatch, NewClient, NewItem, Status};
use facture::store::{compute_totals, StateStore, StateTree};
use facture::{InvoiceTemplate, Store, TomlStateStore};

fn new_client(name: &str, payment_terms: u32) -> NewClient {
    NewClient {
        name: name.to_string(),
        email: "billing@example.com".to_string(),
        phone: String::new(),
        payment_terms,
        address: Address {
            street: "456 Client Avenue".to_string(),
            city: "Lyon".to_string(),
            postal: "69001".to_string(),
            country: "France".to_string(),
        },
        company: CompanyInfo::default(),
    }
}

fn item(description: &str, quantity: u32, unit_price: f64, vat_rate: f64) -> NewItem {
    NewItem {
        description: description.to_string(),
        quantity,
        unit_price,
        vat_rate,
    }
}

fn open_store(dir: &TempDir) -> Store<TomlStateStore> {
    Store::open(TomlStateStore::new(dir.path()))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn totals_follow_every_item_mutation() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    let check = |store: &Store<TomlStateStore>| {
        let invoice = store.invoice(invoice_id).unwrap();
        let expected = compute_totals(&invoice.items);
        assert_eq!(invoice.totals.subtotal, expected.subtotal);
        assert_eq!(invoice.totals.vat_amount, expected.vat_amount);
        assert_eq!(invoice.totals.discount, expected.discount);
        assert_eq!(invoice.totals.total, expected.total);
    };

    check(&store);

    let first = store
        .add_item(invoice_id, item("Consulting", 2, 50.0, 20.0))
        .unwrap();
    check(&store);

    store
        .add_item(invoice_id, item("Hosting", 1, 25.5, 10.0))
        .unwrap();
    check(&store);

    store
        .update_item(
            invoice_id,
            first,
            ItemPatch {
                quantity: Some(4),
                ..Default::default()
            },
        )
        .unwrap();
    check(&store);

    store.remove_item(invoice_id, first).unwrap();
    check(&store);
}

#[test]
fn item_total_is_quantity_times_price() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();
    let item_id = store
        .add_item(invoice_id, item("Consulting", 3, 19.99, 20.0))
        .unwrap();

    let invoice = store.invoice(invoice_id).unwrap();
    assert!(approx(invoice.items[0].total, 3.0 * 19.99));

    store
        .update_item(
            invoice_id,
            item_id,
            ItemPatch {
                unit_price: Some(120.0),
                ..Default::default()
            },
        )
        .unwrap();

    let invoice = store.invoice(invoice_id).unwrap();
    assert!(approx(invoice.items[0].total, 3.0 * 120.0));
}

#[test]
fn vat_aggregation_matches_reference_scenario() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    store
        .add_item(invoice_id, item("Consulting", 2, 50.0, 20.0))
        .unwrap();
    store
        .add_item(invoice_id, item("Hosting", 1, 25.5, 10.0))
        .unwrap();

    let totals = store.invoice(invoice_id).unwrap().totals;
    assert!(approx(totals.subtotal, 125.5));
    assert!(approx(totals.vat_amount, 22.55));
    assert_eq!(totals.discount, 0.0);
    assert!(approx(totals.total, 148.05));
}

#[test]
fn paid_transition_stamps_date_once() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    assert!(store.invoice(invoice_id).unwrap().dates.paid.is_none());

    store.set_status(invoice_id, Status::Sent).unwrap();
    assert!(store.invoice(invoice_id).unwrap().dates.paid.is_none());

    store.set_status(invoice_id, Status::Paid).unwrap();
    let paid_at = store.invoice(invoice_id).unwrap().dates.paid;
    assert!(paid_at.is_some());

    // Rejected transitions leave the paid date untouched
    let err = store.set_status(invoice_id, Status::Sent).unwrap_err();
    assert!(matches!(err, FactureError::InvalidTransition { .. }));
    assert_eq!(store.invoice(invoice_id).unwrap().dates.paid, paid_at);
    assert_eq!(store.invoice(invoice_id).unwrap().status, Status::Paid);
}

#[test]
fn overdue_only_reachable_from_sent() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    let err = store.set_status(invoice_id, Status::Overdue).unwrap_err();
    assert!(matches!(err, FactureError::InvalidTransition { .. }));

    store.set_status(invoice_id, Status::Sent).unwrap();
    store.set_status(invoice_id, Status::Overdue).unwrap();
    store.set_status(invoice_id, Status::Paid).unwrap();
    assert!(store.invoice(invoice_id).unwrap().dates.paid.is_some());
}

#[test]
fn numbers_increase_under_steady_growth() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();

    let mut numbers = Vec::new();
    for _ in 0..5 {
        let id = store.create_invoice(client_id, None, String::new()).unwrap();
        numbers.push(store.invoice(id).unwrap().number.clone());
    }

    assert_eq!(
        numbers,
        vec!["INV-1001", "INV-1002", "INV-1003", "INV-1004", "INV-1005"]
    );
}

#[test]
fn numbers_survive_deletion_without_reuse() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();

    let first = store.create_invoice(client_id, None, String::new()).unwrap();
    let second = store.create_invoice(client_id, None, String::new()).unwrap();
    store.remove_invoice(second).unwrap();

    let third = store.create_invoice(client_id, None, String::new()).unwrap();
    let first_number = store.invoice(first).unwrap().number.clone();
    let third_number = store.invoice(third).unwrap().number.clone();

    assert_eq!(first_number, "INV-1001");
    assert_eq!(third_number, "INV-1003");
    assert_ne!(first_number, third_number);
}

#[test]
fn client_deletion_refused_while_referenced() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    store.create_invoice(client_id, None, String::new()).unwrap();
    store.create_invoice(client_id, None, String::new()).unwrap();

    let err = store.remove_client(client_id).unwrap_err();
    assert!(matches!(err, FactureError::ClientInUse { count: 2, .. }));

    // Nothing was deleted
    assert_eq!(store.clients().len(), 1);
    assert_eq!(store.invoices().len(), 2);

    // Deleting the invoices unblocks the client
    let ids: Vec<_> = store.invoices().iter().map(|i| i.id).collect();
    for id in ids {
        store.remove_invoice(id).unwrap();
    }
    store.remove_client(client_id).unwrap();
    assert!(store.clients().is_empty());
}

#[test]
fn payment_terms_snapshot_not_resynced() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    store
        .update_client(
            client_id,
            ClientPatch {
                payment_terms: Some(45),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(store.client(client_id).unwrap().payment_terms, 45);
    assert_eq!(store.invoice(invoice_id).unwrap().payment_terms, 30);
}

#[test]
fn unknown_item_update_is_reported_and_harmless() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();
    store
        .add_item(invoice_id, item("Consulting", 1, 100.0, 20.0))
        .unwrap();

    let bogus = uuid::Uuid::new_v4();
    let err = store
        .update_item(
            invoice_id,
            bogus,
            ItemPatch {
                quantity: Some(9),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, FactureError::ItemNotFound { .. }));

    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].quantity, 1);
}

#[test]
fn vat_rate_outside_configured_set_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let client_id = store.add_client(new_client("Acme", 30)).unwrap();
    let invoice_id = store.create_invoice(client_id, None, String::new()).unwrap();

    let err = store
        .add_item(invoice_id, item("Consulting", 1, 100.0, 13.0))
        .unwrap_err();
    assert!(matches!(err, FactureError::InvalidVatRate { .. }));
    assert!(store.invoice(invoice_id).unwrap().items.is_empty());

    // 5.5 is in the default set
    store
        .add_item(invoice_id, item("Books", 1, 100.0, 5.5))
        .unwrap();

    // Widening the configured set makes the rate acceptable
    store
        .update_business(facture::BusinessPatch {
            vat_rates: Some(vec![0.0, 5.5, 10.0, 13.0, 20.0]),
            ..Default::default()
        })
        .unwrap();
    store
        .add_item(invoice_id, item("Consulting", 1, 100.0, 13.0))
        .unwrap();
}

#[test]
fn state_round_trips_across_reopen() {
    let dir = TempDir::new().unwrap();

    let invoice_id = {
        let mut store = open_store(&dir);
        let client_id = store.add_client(new_client("Acme", 30)).unwrap();
        let invoice_id = store.create_invoice(client_id, None, "rush job".to_string()).unwrap();
        store
            .add_item(invoice_id, item("Consulting", 2, 50.0, 20.0))
            .unwrap();
        store.set_status(invoice_id, Status::Sent).unwrap();
        store.set_active_template(InvoiceTemplate::Modern).unwrap();
        invoice_id
    };

    let store = open_store(&dir);
    assert_eq!(store.clients().len(), 1);
    assert_eq!(store.active_template(), InvoiceTemplate::Modern);

    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.number, "INV-1001");
    assert_eq!(invoice.status, Status::Sent);
    assert_eq!(invoice.notes, "rush job");
    assert_eq!(invoice.items.len(), 1);
    assert!(approx(invoice.totals.total, 120.0));
    assert_eq!(store.next_invoice_number(), "INV-1002");
}

#[test]
fn corrupt_state_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("state.toml"), "not [valid toml").unwrap();

    let store = open_store(&dir);
    assert!(store.clients().is_empty());
    assert!(store.invoices().is_empty());
    assert_eq!(store.business().name, "Your Business Name");
}

#[test]
fn counter_raised_for_legacy_state() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = open_store(&dir);
        let client_id = store.add_client(new_client("Acme", 30)).unwrap();
        store.create_invoice(client_id, None, String::new()).unwrap();
        store.create_invoice(client_id, None, String::new()).unwrap();
    }

    // Zero out the counter the way a pre-counter state file would look
    let path = dir.path().join("state.toml");
    let content = std::fs::read_to_string(&path).unwrap();
    let content = content.replace("issued = 2", "issued = 0");
    std::fs::write(&path, content).unwrap();

    let store = open_store(&dir);
    assert_eq!(store.next_invoice_number(), "INV-1003");
}

/// Backend whose saves always fail; loads report a fresh start.
struct FailingStore;

impl StateStore for FailingStore {
    fn load(&self) -> facture::Result<Option<StateTree>> {
        Ok(None)
    }

    fn save(&self, _state: &StateTree) -> facture::Result<()> {
        Err(FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk full",
        )))
    }
}

#[test]
fn save_failure_surfaces_but_keeps_memory_state() {
    let mut store = Store::open(FailingStore);

    let err = store.add_client(new_client("Acme", 30)).unwrap_err();
    assert!(matches!(err, FactureError::Io(_)));

    // The mutation is still visible in memory
    assert_eq!(store.clients().len(), 1);
    assert_eq!(store.clients()[0].name, "Acme");
}
