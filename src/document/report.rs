use serde::Serialize;

use super::{BusinessBlock, ClientBlock};

/// A single row in the per-client report table
#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub number: String,
    pub date: String,
    pub due_date: String,
    pub total: f64,
    pub status: String,
}

/// Complete data for rendering the per-client report PDF
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub business: BusinessBlock,
    pub client: ClientBlock,
    pub rows: Vec<ReportRow>,
    pub invoiced: f64,
    pub paid: f64,
    pub outstanding: f64,
    pub currency_symbol: String,
    pub generated_date: String,
    pub filter_from: Option<String>,
    pub filter_to: Option<String>,
    pub filter_status: Option<String>,
}
