use serde::{Deserialize, Serialize};

use super::client::Address;

/// French legal identifiers shown on generated documents
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LegalInfo {
    pub siret: String,
    pub vat_number: String,
    pub rcs: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceSettings {
    /// Invoice number prefix, e.g. "INV-"
    pub prefix: String,
    /// First sequence value, e.g. 1001 -> INV-1001
    pub start_number: u64,
    pub default_vat_rate: f64,
    /// Rates a line item may carry
    pub vat_rates: Vec<f64>,
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentInfo {
    pub iban: String,
    pub bic: String,
    pub paypal_email: String,
}

/// Singleton business identity; mutated in place, never deleted
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessProfile {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: Address,
    pub legal: LegalInfo,
    pub invoice_settings: InvoiceSettings,
    pub payment_info: PaymentInfo,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: "Your Business Name".to_string(),
            logo: String::new(),
            email: "contact@yourbusiness.com".to_string(),
            phone: "+33 1 23 45 67 89".to_string(),
            address: Address {
                street: "123 Business Street".to_string(),
                city: "Paris".to_string(),
                postal: "75001".to_string(),
                country: "France".to_string(),
            },
            legal: LegalInfo {
                siret: "12345678900012".to_string(),
                vat_number: "FR12345678900".to_string(),
                rcs: "Paris B 123 456 789".to_string(),
            },
            invoice_settings: InvoiceSettings {
                prefix: "INV-".to_string(),
                start_number: 1001,
                default_vat_rate: 20.0,
                vat_rates: vec![0.0, 5.5, 10.0, 20.0],
                currency_symbol: "€".to_string(),
            },
            payment_info: PaymentInfo {
                iban: "FR76 1234 5678 9012 3456 7890 123".to_string(),
                bic: "ABCDEFGHXXX".to_string(),
                paypal_email: "payments@yourbusiness.com".to_string(),
            },
        }
    }
}

/// Partial profile update; None fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal: Option<String>,
    pub country: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub rcs: Option<String>,
    pub prefix: Option<String>,
    pub start_number: Option<u64>,
    pub default_vat_rate: Option<f64>,
    pub vat_rates: Option<Vec<f64>>,
    pub currency_symbol: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub paypal_email: Option<String>,
}

impl BusinessPatch {
    pub fn apply(self, profile: &mut BusinessProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(logo) = self.logo {
            profile.logo = logo;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(phone) = self.phone {
            profile.phone = phone;
        }
        if let Some(street) = self.street {
            profile.address.street = street;
        }
        if let Some(city) = self.city {
            profile.address.city = city;
        }
        if let Some(postal) = self.postal {
            profile.address.postal = postal;
        }
        if let Some(country) = self.country {
            profile.address.country = country;
        }
        if let Some(siret) = self.siret {
            profile.legal.siret = siret;
        }
        if let Some(vat) = self.vat_number {
            profile.legal.vat_number = vat;
        }
        if let Some(rcs) = self.rcs {
            profile.legal.rcs = rcs;
        }
        if let Some(prefix) = self.prefix {
            profile.invoice_settings.prefix = prefix;
        }
        if let Some(n) = self.start_number {
            profile.invoice_settings.start_number = n;
        }
        if let Some(rate) = self.default_vat_rate {
            profile.invoice_settings.default_vat_rate = rate;
        }
        if let Some(rates) = self.vat_rates {
            profile.invoice_settings.vat_rates = rates;
        }
        if let Some(symbol) = self.currency_symbol {
            profile.invoice_settings.currency_symbol = symbol;
        }
        if let Some(iban) = self.iban {
            profile.payment_info.iban = iban;
        }
        if let Some(bic) = self.bic {
            profile.payment_info.bic = bic;
        }
        if let Some(email) = self.paypal_email {
            profile.payment_info.paypal_email = email;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.logo.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.postal.is_none()
            && self.country.is_none()
            && self.siret.is_none()
            && self.vat_number.is_none()
            && self.rcs.is_none()
            && self.prefix.is_none()
            && self.start_number.is_none()
            && self.default_vat_rate.is_none()
            && self.vat_rates.is_none()
            && self.currency_symbol.is_none()
            && self.iban.is_none()
            && self.bic.is_none()
            && self.paypal_email.is_none()
    }
}
