use serde::Deserialize;
use serde_json::Value;

use crate::models::RemoteTableCredentials;
use crate::services::import::{ImportError, Row};

#[derive(Deserialize)]
struct RecordsResponse {
    records: Vec<RemoteRecord>,
}

#[derive(Deserialize)]
struct RemoteRecord {
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// Fetches one table from the remote tabular-data service. The service
/// answers `{"records": [{"id": ..., "fields": {...}}]}`; each record's
/// fields become one import row.
pub async fn fetch_remote_table(
    credentials: &RemoteTableCredentials,
) -> Result<Vec<Row>, ImportError> {
    let url = format!(
        "{}/{}",
        credentials.base_url.trim_end_matches('/'),
        credentials.table
    );

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .bearer_auth(&credentials.api_key)
        .send()
        .await
        .map_err(|e| ImportError::Remote(format!("connection failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Remote(format!("{}: {}", status, body)));
    }

    let body: RecordsResponse = response
        .json()
        .await
        .map_err(|e| ImportError::Remote(format!("malformed response: {}", e)))?;

    let rows = body
        .records
        .into_iter()
        .map(|record| {
            record
                .fields
                .into_iter()
                .map(|(name, value)| (name, value_to_string(&value)))
                .collect()
        })
        .collect();
    Ok(rows)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_string_flattens_scalars_and_arrays() {
        assert_eq!(value_to_string(&json!("SvcA")), "SvcA");
        assert_eq!(value_to_string(&json!(1500)), "1500");
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!(["SvcA", "SvcB"])), "SvcA, SvcB");
    }

    #[test]
    fn test_records_response_shape() {
        let body = json!({
            "records": [
                {"id": "rec1", "fields": {"Supplier": "Acme", "Type": "hotel"}},
                {"id": "rec2", "fields": {}}
            ]
        });
        let parsed: RecordsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.records[0].fields.get("Supplier"),
            Some(&json!("Acme"))
        );
    }
}
