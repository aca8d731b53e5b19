use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal: String,
    pub country: String,
}

/// Legal identity of the client's company
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub siret: String,
    #[serde(default)]
    pub vat_number: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Payment terms in days; copied onto each invoice at creation
    pub payment_terms: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub address: Address,
    pub company: CompanyInfo,
}

/// Input for creating a client; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub payment_terms: u32,
    pub address: Address,
    pub company: CompanyInfo,
}

/// Partial update; None fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub payment_terms: Option<u32>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal: Option<String>,
    pub country: Option<String>,
    pub company_name: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
}

impl ClientPatch {
    pub fn apply(self, client: &mut Client) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        if let Some(phone) = self.phone {
            client.phone = phone;
        }
        if let Some(days) = self.payment_terms {
            client.payment_terms = days;
        }
        if let Some(street) = self.street {
            client.address.street = street;
        }
        if let Some(city) = self.city {
            client.address.city = city;
        }
        if let Some(postal) = self.postal {
            client.address.postal = postal;
        }
        if let Some(country) = self.country {
            client.address.country = country;
        }
        if let Some(name) = self.company_name {
            client.company.name = name;
        }
        if let Some(siret) = self.siret {
            client.company.siret = siret;
        }
        if let Some(vat) = self.vat_number {
            client.company.vat_number = vat;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.payment_terms.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.postal.is_none()
            && self.country.is_none()
            && self.company_name.is_none()
            && self.siret.is_none()
            && self.vat_number.is_none()
    }
}
