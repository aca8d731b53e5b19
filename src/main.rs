mod document;
mod error;
mod model;
mod pdf;
mod store;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};
use uuid::Uuid;

use crate::document::{BusinessBlock, ClientBlock, InvoiceDocument, ReportData, ReportRow};
use crate::error::{FactureError, Result};
use crate::model::{
    Address, BusinessPatch, ClientPatch, CompanyInfo, Invoice, InvoicePatch, InvoiceTemplate,
    ItemPatch, NewClient, NewItem, Status,
};
use crate::pdf::{generate_invoice_pdf, generate_report_pdf};
use crate::store::{data_dir, Store, TomlStateStore};

#[derive(Parser)]
#[command(name = "facture")]
#[command(version, about = "CLI invoicing and client management for small businesses", long_about = None)]
struct Cli {
    /// Path to data directory (default: ~/.facture or XDG data)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory with a default business profile
    Init,

    /// Add a new client
    AddClient {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        street: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        postal: Option<String>,

        #[arg(long)]
        country: Option<String>,

        /// Client's company name
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        siret: Option<String>,

        #[arg(long)]
        vat_number: Option<String>,

        /// Payment terms in days
        #[arg(long, default_value_t = 30)]
        payment_terms: u32,
    },

    /// List clients
    Clients,

    /// Update a client's details
    EditClient {
        /// Client index from 'clients' or exact name
        client: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        street: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        postal: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        siret: Option<String>,

        #[arg(long)]
        vat_number: Option<String>,

        #[arg(long)]
        payment_terms: Option<u32>,
    },

    /// Delete a client (refused while invoices reference it)
    RemoveClient {
        /// Client index from 'clients' or exact name
        client: String,
    },

    /// Create a new draft invoice for a client
    NewInvoice {
        /// Client index from 'clients' or exact name
        #[arg(short, long)]
        client: String,

        /// Layout template (classic, modern, corporate, creative, minimal)
        #[arg(short, long)]
        template: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice in full
    Show {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,
    },

    /// Delete an invoice
    Delete {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,
    },

    /// Update an invoice's notes or template
    EditInvoice {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        template: Option<String>,
    },

    /// Add a line item to an invoice
    AddItem {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(short, long)]
        unit_price: f64,

        /// VAT percentage (default: business profile's default rate)
        #[arg(short, long)]
        vat_rate: Option<f64>,
    },

    /// Update a line item
    EditItem {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        /// 1-based item index from 'show'
        #[arg(short, long)]
        item: usize,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        quantity: Option<u32>,

        #[arg(short, long)]
        unit_price: Option<f64>,

        #[arg(short, long)]
        vat_rate: Option<f64>,
    },

    /// Remove a line item
    RemoveItem {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        /// 1-based item index from 'show'
        #[arg(short, long)]
        item: usize,
    },

    /// Advance an invoice's status (draft -> sent -> paid, sent -> overdue)
    SetStatus {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        /// New status: draft, sent, paid, overdue
        status: String,
    },

    /// Show the business profile
    Business,

    /// Update the business profile
    EditBusiness {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        logo: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        street: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        postal: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        siret: Option<String>,

        #[arg(long)]
        vat_number: Option<String>,

        #[arg(long)]
        rcs: Option<String>,

        /// Invoice number prefix, e.g. INV-
        #[arg(long)]
        prefix: Option<String>,

        /// First invoice sequence number, e.g. 1001
        #[arg(long)]
        start_number: Option<u64>,

        #[arg(long)]
        default_vat_rate: Option<f64>,

        /// Allowed per-item VAT rates, comma-separated (e.g. 0,5.5,10,20)
        #[arg(long, value_delimiter = ',')]
        vat_rates: Option<Vec<f64>>,

        #[arg(long)]
        currency_symbol: Option<String>,

        #[arg(long)]
        iban: Option<String>,

        #[arg(long)]
        bic: Option<String>,

        #[arg(long)]
        paypal_email: Option<String>,
    },

    /// Set the default document template
    SetTemplate {
        /// classic, modern, corporate, creative, minimal
        template: String,
    },

    /// Generate an invoice PDF
    Pdf {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1001)
        invoice: String,

        /// Custom output file path (default: output_dir/<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Generate a PDF report of invoices for a client
    Report {
        /// Client index from 'clients' or exact name
        #[arg(short, long)]
        client: String,

        /// Filter invoices from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter invoices to this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Filter by status (draft, sent, paid, overdue)
        #[arg(long)]
        status: Option<String>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Show business status and next invoice number
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let dir = match cli.data_dir {
        Some(p) => p,
        None => data_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&dir),
        Commands::AddClient {
            name,
            email,
            phone,
            street,
            city,
            postal,
            country,
            company,
            siret,
            vat_number,
            payment_terms,
        } => cmd_add_client(
            &dir,
            NewClient {
                name,
                email,
                phone: phone.unwrap_or_default(),
                payment_terms,
                address: Address {
                    street: street.unwrap_or_default(),
                    city: city.unwrap_or_default(),
                    postal: postal.unwrap_or_default(),
                    country: country.unwrap_or_default(),
                },
                company: CompanyInfo {
                    name: company.unwrap_or_default(),
                    siret: siret.unwrap_or_default(),
                    vat_number: vat_number.unwrap_or_default(),
                },
            },
        ),
        Commands::Clients => cmd_clients(&dir),
        Commands::EditClient {
            client,
            name,
            email,
            phone,
            street,
            city,
            postal,
            country,
            company,
            siret,
            vat_number,
            payment_terms,
        } => cmd_edit_client(
            &dir,
            &client,
            ClientPatch {
                name,
                email,
                phone,
                payment_terms,
                street,
                city,
                postal,
                country,
                company_name: company,
                siret,
                vat_number,
            },
        ),
        Commands::RemoveClient { client } => cmd_remove_client(&dir, &client),
        Commands::NewInvoice {
            client,
            template,
            notes,
        } => cmd_new_invoice(&dir, &client, template, notes),
        Commands::List { limit } => cmd_list(&dir, limit),
        Commands::Show { invoice } => cmd_show(&dir, &invoice),
        Commands::Delete { invoice } => cmd_delete(&dir, &invoice),
        Commands::EditInvoice {
            invoice,
            notes,
            template,
        } => cmd_edit_invoice(&dir, &invoice, notes, template),
        Commands::AddItem {
            invoice,
            description,
            quantity,
            unit_price,
            vat_rate,
        } => cmd_add_item(&dir, &invoice, description, quantity, unit_price, vat_rate),
        Commands::EditItem {
            invoice,
            item,
            description,
            quantity,
            unit_price,
            vat_rate,
        } => cmd_edit_item(
            &dir,
            &invoice,
            item,
            ItemPatch {
                description,
                quantity,
                unit_price,
                vat_rate,
            },
        ),
        Commands::RemoveItem { invoice, item } => cmd_remove_item(&dir, &invoice, item),
        Commands::SetStatus { invoice, status } => cmd_set_status(&dir, &invoice, &status),
        Commands::Business => cmd_business(&dir),
        Commands::EditBusiness {
            name,
            logo,
            email,
            phone,
            street,
            city,
            postal,
            country,
            siret,
            vat_number,
            rcs,
            prefix,
            start_number,
            default_vat_rate,
            vat_rates,
            currency_symbol,
            iban,
            bic,
            paypal_email,
        } => cmd_edit_business(
            &dir,
            BusinessPatch {
                name,
                logo,
                email,
                phone,
                street,
                city,
                postal,
                country,
                siret,
                vat_number,
                rcs,
                prefix,
                start_number,
                default_vat_rate,
                vat_rates,
                currency_symbol,
                iban,
                bic,
                paypal_email,
            },
        ),
        Commands::SetTemplate { template } => cmd_set_template(&dir, &template),
        Commands::Pdf {
            invoice,
            output,
            open,
        } => cmd_pdf(&dir, &invoice, output, open),
        Commands::Report {
            client,
            from,
            to,
            status,
            open,
        } => cmd_report(&dir, &client, from, to, status, open),
        Commands::Status => cmd_status(&dir),
    }
}

/// Open the store at an initialized data directory
fn open_store(dir: &PathBuf) -> Result<Store<TomlStateStore>> {
    if !dir.exists() {
        return Err(FactureError::NotInitialized(dir.clone()));
    }
    Ok(Store::open(TomlStateStore::new(dir)))
}

/// Initialize the data directory with a default state
fn cmd_init(dir: &PathBuf) -> Result<()> {
    use std::fs;

    if dir.exists() {
        return Err(FactureError::AlreadyInitialized(dir.clone()));
    }

    fs::create_dir_all(dir)?;
    fs::create_dir_all(dir.join("output"))?;

    Store::init(TomlStateStore::new(dir))?;

    println!("Initialized facture data at: {}", dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Set up your business profile:  facture edit-business --name \"...\" --email \"...\"");
    println!("  2. Add your first client:         facture add-client --name \"...\" --email \"...\"");
    println!("  3. Create an invoice:             facture new-invoice --client 1");
    println!("  4. Add line items:                facture add-item 1 -d \"Consulting\" -q 8 -u 150");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "CITY")]
    city: String,
    #[tabled(rename = "TERMS")]
    terms: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

fn format_whole_money(value: f64, currency_symbol: &str) -> String {
    let rounded = value.round() as i64;
    let grouped = format_grouped_int(rounded);
    format!("{}{:>6}", currency_symbol, grouped)
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_report_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let parts: Vec<&str> = rounded.split('.').collect();
    let whole = parts[0];
    let frac = parts[1];

    // Group digits in the whole part
    let negative = whole.starts_with('-');
    let digits = if negative { &whole[1..] } else { whole };
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 6 {
        return table.to_string();
    }

    // Merge columns #, NUMBER, DATE into one label cell; keep TOTAL column; drop STATUS and CLIENT
    let left_width = widths[0] + widths[1] + widths[2] + 2; // +2 for the two ┴ replaced by spaces
    let total_width = widths[3];
    let status_width = widths[4];
    let client_width = widths[5];

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge left 3 columns, keep TOTAL, close off STATUS+CLIENT
    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(total_width),
        "─".repeat(status_width),
        "─".repeat(client_width),
    ));

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}

/// Clients sorted the way 'clients' lists them (by name)
fn sorted_clients(store: &Store<TomlStateStore>) -> Vec<&model::Client> {
    let mut clients: Vec<_> = store.clients().iter().collect();
    clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    clients
}

/// Resolve a client reference to its id.
/// Accepts either an index (1-based) from 'clients' or the exact name.
fn resolve_client_id(store: &Store<TomlStateStore>, reference: &str) -> Result<Uuid> {
    let clients = sorted_clients(store);

    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 || idx > clients.len() {
            return Err(FactureError::ClientNotFound(reference.to_string()));
        }
        return Ok(clients[idx - 1].id);
    }

    clients
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(reference))
        .map(|c| c.id)
        .ok_or_else(|| FactureError::ClientNotFound(reference.to_string()))
}

/// Resolve an invoice reference to its id.
/// Accepts either an index (1-based) from 'list' or the invoice number.
fn resolve_invoice_id(store: &Store<TomlStateStore>, reference: &str) -> Result<Uuid> {
    // Try to parse as an index first
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(FactureError::InvalidInvoiceRef(reference.to_string()));
        }
        // Invoices are displayed in reverse order (newest first), 1-indexed
        let invoices: Vec<_> = store.invoices().iter().rev().collect();
        if idx > invoices.len() {
            return Err(FactureError::InvalidInvoiceRef(reference.to_string()));
        }
        return Ok(invoices[idx - 1].id);
    }

    // Otherwise, treat as invoice number
    store
        .invoices()
        .iter()
        .find(|i| i.number == reference)
        .map(|i| i.id)
        .ok_or_else(|| FactureError::InvoiceNotFound(reference.to_string()))
}

/// Resolve a 1-based item index within an invoice to the item's id
fn resolve_item_id(invoice: &Invoice, index: usize) -> Result<Uuid> {
    if index == 0 || index > invoice.items.len() {
        return Err(FactureError::InvalidItemRef(index.to_string()));
    }
    Ok(invoice.items[index - 1].id)
}

fn client_name(store: &Store<TomlStateStore>, id: Uuid) -> String {
    store
        .client(id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "(unknown)".to_string())
}

/// Add a new client
fn cmd_add_client(dir: &PathBuf, new: NewClient) -> Result<()> {
    let mut store = open_store(dir)?;
    let name = new.name.clone();
    let terms = new.payment_terms;
    store.add_client(new)?;

    println!("Added client '{}'", name);
    println!("  Payment terms: Net {} days", terms);
    Ok(())
}

/// List clients
fn cmd_clients(dir: &PathBuf) -> Result<()> {
    let store = open_store(dir)?;

    if store.clients().is_empty() {
        println!("No clients yet.");
        println!("Add one with: facture add-client --name \"...\" --email \"...\"");
        return Ok(());
    }

    let rows: Vec<ClientRow> = sorted_clients(&store)
        .iter()
        .enumerate()
        .map(|(idx, client)| ClientRow {
            index: idx + 1,
            name: client.name.clone(),
            email: client.email.clone(),
            city: client.address.city.clone(),
            terms: format!("Net {}", client.payment_terms),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Update a client
fn cmd_edit_client(dir: &PathBuf, reference: &str, patch: ClientPatch) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_client_id(&store, reference)?;

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    store.update_client(id, patch)?;
    println!("Updated client '{}'", client_name(&store, id));
    Ok(())
}

/// Delete a client (refused while invoices reference it)
fn cmd_remove_client(dir: &PathBuf, reference: &str) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_client_id(&store, reference)?;
    let name = client_name(&store, id);

    store.remove_client(id)?;
    println!("Removed client '{}'", name);
    Ok(())
}

/// Create a new draft invoice
fn cmd_new_invoice(
    dir: &PathBuf,
    client_ref: &str,
    template: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let mut store = open_store(dir)?;
    let client_id = resolve_client_id(&store, client_ref)?;
    let template = template
        .map(|t| InvoiceTemplate::from_str(&t))
        .transpose()?;

    let id = store.create_invoice(client_id, template, notes.unwrap_or_default())?;
    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(client_ref.to_string()))?;

    println!("Created {}", invoice.number);
    println!("  Client: {}", client_name(&store, client_id));
    println!("  Due:    {}", invoice.dates.due.format("%Y-%m-%d"));
    println!("  Status: draft");
    println!();
    println!(
        "Add items with: facture add-item {} -d \"...\" -q 1 -u 100",
        invoice.number
    );
    Ok(())
}

/// Fetch the current EUR→USD exchange rate from the Frankfurter API.
/// Returns None on any failure (network, timeout, parse error) so the
/// caller can silently skip the USD line.
fn fetch_eur_to_usd_rate() -> Option<f64> {
    use std::time::Duration;
    use ureq::Agent;

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(3)))
        .build()
        .into();

    let body: String = agent
        .get("https://api.frankfurter.dev/v1/latest?base=EUR&symbols=USD")
        .call()
        .ok()?
        .body_mut()
        .read_to_string()
        .ok()?;

    let json: serde_json::Value = serde_json::from_str(&body).ok()?;
    json["rates"]["USD"].as_f64()
}

/// List invoices newest first, with a financial footer
fn cmd_list(dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    let store = open_store(dir)?;
    let symbol = store.business().invoice_settings.currency_symbol.clone();

    if store.invoices().is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let invoices: Vec<_> = store.invoices().iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, invoice)| InvoiceRow {
            index: idx + 1,
            number: invoice.number.clone(),
            date: invoice.dates.created.format("%Y-%m-%d").to_string(),
            total: format_whole_money(invoice.totals.total, &symbol),
            status: invoice.display_status(today).to_string().to_uppercase(),
            client: client_name(&store, invoice.client_id),
        })
        .collect();

    // Financial summary over the shown invoices; paid means stored status
    let shown_total: f64 = invoices.iter().map(|(_, i)| i.totals.total).sum();
    let shown_paid: f64 = invoices
        .iter()
        .filter(|(_, i)| i.status == Status::Paid)
        .map(|(_, i)| i.totals.total)
        .sum();
    let shown_outstanding: f64 = shown_total - shown_paid;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let total_amount = format_whole_money(shown_total, &symbol);
    let paid_amount = format_whole_money(shown_paid, &symbol);
    let outstanding_amount = format_whole_money(shown_outstanding, &symbol);
    let table = add_financial_footer(&table, &total_amount, &paid_amount, &outstanding_amount);

    println!("{table}");

    println!();
    println!("Total: {} invoices", store.invoices().len());

    // Show outstanding amount converted to USD if there's an outstanding balance
    if shown_outstanding > 0.0 {
        if let Some(rate) = fetch_eur_to_usd_rate() {
            let usd_amount = (shown_outstanding * rate).round() as i64;
            println!(
                "Outstanding in USD: $ {} (1 EUR = {:.2} USD)",
                format_grouped_int(usd_amount),
                rate
            );
        }
    }

    println!("Use index number with show/delete/add-item/set-status/pdf (e.g., 'facture show 1')");

    Ok(())
}

/// Show one invoice in full
fn cmd_show(dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    let store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let invoice = store
        .invoice(id)
        .ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    let symbol = &store.business().invoice_settings.currency_symbol;

    let today = Utc::now().date_naive();
    println!(
        "Invoice {} ({})",
        invoice.number,
        invoice.display_status(today)
    );
    println!("  Client:   {}", client_name(&store, invoice.client_id));
    println!(
        "  Created:  {}   Due: {}",
        invoice.dates.created.format("%Y-%m-%d"),
        invoice.dates.due.format("%Y-%m-%d")
    );
    if let Some(paid) = invoice.dates.paid {
        println!("  Paid:     {}", paid.format("%Y-%m-%d"));
    }
    println!("  Terms:    Net {} days", invoice.payment_terms);
    println!("  Template: {}", invoice.template);

    if invoice.items.is_empty() {
        println!();
        println!("No items. Add one with: facture add-item {} -d \"...\" -q 1 -u 100", invoice.number);
    } else {
        let rows: Vec<ItemRow> = invoice
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                index: idx + 1,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: format!("{}{:.2}", symbol, item.unit_price),
                vat: format!("{}%", item.vat_rate),
                total: format!("{}{:.2}", symbol, item.total),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!();
        println!("{table}");
    }

    println!();
    println!("  Subtotal: {}{}", symbol, format_report_amount(invoice.totals.subtotal));
    if invoice.totals.discount > 0.0 {
        println!("  Discount: -{}{}", symbol, format_report_amount(invoice.totals.discount));
    }
    println!("  VAT:      {}{}", symbol, format_report_amount(invoice.totals.vat_amount));
    println!("  Total:    {}{}", symbol, format_report_amount(invoice.totals.total));

    if !invoice.notes.is_empty() {
        println!();
        println!("  Notes: {}", invoice.notes);
    }

    Ok(())
}

/// Delete an invoice
fn cmd_delete(dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let number = store
        .invoice(id)
        .map(|i| i.number.clone())
        .unwrap_or_else(|| invoice_ref.to_string());

    store.remove_invoice(id)?;
    println!("Deleted {}", number);
    Ok(())
}

/// Update an invoice's notes or template
fn cmd_edit_invoice(
    dir: &PathBuf,
    invoice_ref: &str,
    notes: Option<String>,
    template: Option<String>,
) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let template = template
        .map(|t| InvoiceTemplate::from_str(&t))
        .transpose()?;

    if notes.is_none() && template.is_none() {
        println!("Nothing to update.");
        return Ok(());
    }

    store.update_invoice(id, InvoicePatch { notes, template })?;
    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    println!("Updated {}", invoice.number);
    Ok(())
}

/// Add a line item and show the recomputed totals
fn cmd_add_item(
    dir: &PathBuf,
    invoice_ref: &str,
    description: String,
    quantity: u32,
    unit_price: f64,
    vat_rate: Option<f64>,
) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let vat_rate = vat_rate.unwrap_or(store.business().invoice_settings.default_vat_rate);
    let symbol = store.business().invoice_settings.currency_symbol.clone();

    store.add_item(
        id,
        NewItem {
            description: description.clone(),
            quantity,
            unit_price,
            vat_rate,
        },
    )?;

    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    println!("Added item to {}", invoice.number);
    println!("  {} x {} @ {}{:.2}", quantity, description, symbol, unit_price);
    println!("  Total:  {}{}", symbol, format_report_amount(invoice.totals.total));
    Ok(())
}

/// Update a line item and show the recomputed totals
fn cmd_edit_item(dir: &PathBuf, invoice_ref: &str, index: usize, patch: ItemPatch) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let invoice = store
        .invoice(id)
        .ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    let item_id = resolve_item_id(invoice, index)?;
    let symbol = store.business().invoice_settings.currency_symbol.clone();

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    store.update_item(id, item_id, patch)?;

    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    println!("Updated item {} of {}", index, invoice.number);
    println!("  Total:  {}{}", symbol, format_report_amount(invoice.totals.total));
    Ok(())
}

/// Remove a line item and show the recomputed totals
fn cmd_remove_item(dir: &PathBuf, invoice_ref: &str, index: usize) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let invoice = store
        .invoice(id)
        .ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    let item_id = resolve_item_id(invoice, index)?;
    let symbol = store.business().invoice_settings.currency_symbol.clone();

    store.remove_item(id, item_id)?;

    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    println!("Removed item {} from {}", index, invoice.number);
    println!("  Total:  {}{}", symbol, format_report_amount(invoice.totals.total));
    Ok(())
}

/// Advance an invoice's status
fn cmd_set_status(dir: &PathBuf, invoice_ref: &str, status: &str) -> Result<()> {
    let mut store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let status = Status::from_str(status)?;

    store.set_status(id, status)?;

    let invoice = store.invoice(id).ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    println!("Marked {} as {}", invoice.number, status);
    if status == Status::Paid {
        if let Some(paid) = invoice.dates.paid {
            println!("  Paid on: {}", paid.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

/// Show the business profile
fn cmd_business(dir: &PathBuf) -> Result<()> {
    let store = open_store(dir)?;
    let business = store.business();
    let settings = &business.invoice_settings;

    println!("Business Profile");
    println!("{}", "-".repeat(50));
    println!("Name:          {}", business.name);
    println!("Email:         {}", business.email);
    println!("Phone:         {}", business.phone);
    println!(
        "Address:       {}, {} {}, {}",
        business.address.street, business.address.postal, business.address.city,
        business.address.country
    );
    println!("SIRET:         {}", business.legal.siret);
    println!("VAT number:    {}", business.legal.vat_number);
    println!("RCS:           {}", business.legal.rcs);
    println!();
    println!("Numbering:     {}{} onwards", settings.prefix, settings.start_number);
    println!("Default VAT:   {}%", settings.default_vat_rate);
    println!(
        "VAT rates:     {}",
        settings
            .vat_rates
            .iter()
            .map(|r| format!("{r}%"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("IBAN:          {}", business.payment_info.iban);
    println!("BIC:           {}", business.payment_info.bic);
    println!("PayPal:        {}", business.payment_info.paypal_email);

    Ok(())
}

/// Update the business profile
fn cmd_edit_business(dir: &PathBuf, patch: BusinessPatch) -> Result<()> {
    let mut store = open_store(dir)?;

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    store.update_business(patch)?;
    println!("Updated business profile");
    Ok(())
}

/// Set the default document template
fn cmd_set_template(dir: &PathBuf, template: &str) -> Result<()> {
    let mut store = open_store(dir)?;
    let template = InvoiceTemplate::from_str(template)?;

    store.set_active_template(template)?;
    println!("Default template set to '{}'", template);
    Ok(())
}

fn open_path(pdf_path: &PathBuf) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(FactureError::Io)?;
    }
    Ok(())
}

/// Generate an invoice PDF
fn cmd_pdf(dir: &PathBuf, invoice_ref: &str, output: Option<PathBuf>, open: bool) -> Result<()> {
    let store = open_store(dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let invoice = store
        .invoice(id)
        .ok_or_else(|| FactureError::InvoiceNotFound(invoice_ref.to_string()))?;
    let client = store
        .client(invoice.client_id)
        .ok_or_else(|| FactureError::ClientNotFound(invoice.client_id.to_string()))?;

    let document = InvoiceDocument::assemble(invoice, client, store.business(), invoice.template);

    // Determine output path
    let output_dir = dir.join("output");
    std::fs::create_dir_all(&output_dir)?;
    let pdf_path = output.unwrap_or_else(|| output_dir.join(format!("{}.pdf", invoice.number)));

    generate_invoice_pdf(&document, &pdf_path)?;

    let symbol = &store.business().invoice_settings.currency_symbol;
    println!("Generated {}", invoice.number);
    println!("  Client: {}", client.name);
    println!("  Total:  {}{}", symbol, format_report_amount(invoice.totals.total));
    println!("  Saved:  {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// Lowercase a client name into a filename-safe slug
fn client_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Generate a PDF report of invoices for a client
fn cmd_report(
    dir: &PathBuf,
    client_ref: &str,
    from: Option<String>,
    to: Option<String>,
    status: Option<String>,
    open: bool,
) -> Result<()> {
    let store = open_store(dir)?;
    let client_id = resolve_client_id(&store, client_ref)?;
    let client = store
        .client(client_id)
        .ok_or_else(|| FactureError::ClientNotFound(client_ref.to_string()))?;

    // Parse date filters
    let from_date = from
        .as_ref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| FactureError::InvalidDate(s.clone()))
        })
        .transpose()?;
    let to_date = to
        .as_ref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| FactureError::InvalidDate(s.clone()))
        })
        .transpose()?;

    // Validate status filter against the lifecycle states
    let status_filter = status
        .as_ref()
        .map(|s| Status::from_str(s))
        .transpose()?;

    let today = Utc::now().date_naive();

    // Filter this client's invoices; status matches what listings display
    let filtered: Vec<_> = store
        .invoices()
        .iter()
        .filter(|i| i.client_id == client_id)
        .filter(|i| from_date.map_or(true, |d| i.dates.created.date_naive() >= d))
        .filter(|i| to_date.map_or(true, |d| i.dates.created.date_naive() <= d))
        .filter(|i| status_filter.map_or(true, |s| i.display_status(today) == s))
        .collect();

    if filtered.is_empty() {
        println!("No invoices found for client '{}' with the given filters.", client.name);
        return Ok(());
    }

    let rows: Vec<ReportRow> = filtered
        .iter()
        .map(|i| ReportRow {
            number: i.number.clone(),
            date: i.dates.created.format("%B %d, %Y").to_string(),
            due_date: i.dates.due.format("%B %d, %Y").to_string(),
            total: i.totals.total,
            status: i.display_status(today).to_string(),
        })
        .collect();

    // Financial summary; paid means stored status
    let invoiced: f64 = filtered.iter().map(|i| i.totals.total).sum();
    let paid: f64 = filtered
        .iter()
        .filter(|i| i.status == Status::Paid)
        .map(|i| i.totals.total)
        .sum();
    let outstanding = invoiced - paid;

    let report_data = ReportData {
        business: BusinessBlock::from_profile(store.business()),
        client: ClientBlock::from_client(client),
        rows,
        invoiced,
        paid,
        outstanding,
        currency_symbol: store.business().invoice_settings.currency_symbol.clone(),
        generated_date: Utc::now().format("%B %d, %Y").to_string(),
        filter_from: from.clone(),
        filter_to: to.clone(),
        filter_status: status.clone(),
    };

    // Determine output path
    let output_dir = dir.join("output");
    std::fs::create_dir_all(&output_dir)?;

    let today_str = Utc::now().format("%Y-%m-%d").to_string();
    let pdf_filename = format!("REPORT-{}-{}.pdf", client_slug(&client.name), today_str);
    let pdf_path = output_dir.join(&pdf_filename);

    generate_report_pdf(&report_data, &pdf_path)?;

    let symbol = &store.business().invoice_settings.currency_symbol;
    println!("Generated report for '{}'", client.name);
    println!("  Invoices: {}", filtered.len());
    println!("  Invoiced: {}{}", symbol, format_report_amount(invoiced));
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// Show business status and next invoice number
fn cmd_status(dir: &PathBuf) -> Result<()> {
    let store = open_store(dir)?;
    let business = store.business();
    let symbol = &business.invoice_settings.currency_symbol;

    println!("Facture Status");
    println!("{}", "-".repeat(50));
    println!("Data directory:   {}", dir.display());
    println!("Business:         {}", business.name);
    println!("Clients:          {}", store.clients().len());
    println!("Invoices:         {}", store.invoices().len());
    println!("Next invoice:     {}", store.next_invoice_number());
    println!("Template:         {}", store.active_template());

    if !store.invoices().is_empty() {
        println!();
        println!("Recent invoices:");
        for invoice in store.invoices().iter().rev().take(5) {
            println!(
                "  {} - {} - {}{:.2}",
                invoice.number,
                client_name(&store, invoice.client_id),
                symbol,
                invoice.totals.total
            );
        }
    }

    Ok(())
}
