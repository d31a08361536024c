//! Phone commands

use anyhow::{bail, Result};
use connecta_forms::domain::{validate_all, PhoneNumber};
use serde::Serialize;
use tabled::Tabled;

use super::Context;

#[derive(Debug, Serialize, Tabled)]
pub struct PhoneRow {
    #[tabled(rename = "Input")]
    pub input: String,
    #[tabled(rename = "E.164")]
    pub e164: String,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Result")]
    pub result: String,
}

pub fn check(raw: &str) -> PhoneRow {
    match PhoneNumber::parse(raw) {
        Ok(phone) => PhoneRow {
            input: raw.to_string(),
            e164: phone.to_e164(),
            country: phone.country().to_string(),
            result: "valid".into(),
        },
        Err(e) => PhoneRow {
            input: raw.to_string(),
            e164: String::new(),
            country: String::new(),
            result: e.to_string(),
        },
    }
}

pub fn handle(context: &Context, numbers: &[String]) -> Result<()> {
    let rows: Vec<PhoneRow> = numbers.iter().map(String::as_str).map(check).collect();
    context.format.print_rows(&rows);

    let invalid = validate_all(numbers);
    if !invalid.is_empty() {
        bail!("{} of {} numbers are invalid", invalid.len(), numbers.len());
    }
    Ok(())
}
