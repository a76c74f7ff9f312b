use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_decimal(value: &str) -> Result<f64> {
    value
        .replace(',', ".")
        .trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("Parse decimal: {}", e))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let formats = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%Y.%m.%d"];
    for fmt in formats.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}
