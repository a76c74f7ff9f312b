use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::models::{Order, Product, RecordType, Supplier};
use crate::store::DEFAULT_SUPPLIER_TYPE;
use crate::utils::{parse_date, parse_decimal};

/// One imported row: canonical (or passed-through) column name to raw value.
pub type Row = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("could not parse input: {0}")]
    Parse(String),
    #[error("no valid rows for {record_type:?}: {reason}")]
    Validation {
        record_type: RecordType,
        reason: String,
    },
    #[error("remote table service: {0}")]
    Remote(String),
}

#[derive(Debug, Clone)]
pub enum RecordBatch {
    Orders(Vec<Order>),
    Products(Vec<Product>),
    Suppliers(Vec<Supplier>),
}

pub fn required_fields(record_type: RecordType) -> &'static [&'static str] {
    match record_type {
        RecordType::Orders => &[
            "id",
            "customer_name",
            "display_name",
            "departure_date",
            "services",
        ],
        RecordType::Products => &[
            "name",
            "supplier_name",
            "unit_price",
            "category",
            "payment_method",
        ],
        RecordType::Suppliers => &["name", "supplier_type"],
    }
}

/// Alias table: canonical field name to accepted source column spellings.
/// Source columns are matched case-insensitively with underscores and
/// dashes treated as spaces; unmatched columns pass through unchanged.
fn field_aliases(record_type: RecordType) -> &'static [(&'static str, &'static [&'static str])] {
    match record_type {
        RecordType::Orders => &[
            ("id", &["id", "order id", "order no", "order number"]),
            (
                "customer_name",
                &["customer", "customer name", "client", "client name"],
            ),
            (
                "display_name",
                &["display name", "name", "title", "order name"],
            ),
            (
                "departure_date",
                &["departure", "departure date", "date", "start date", "travel date"],
            ),
            ("services", &["services", "service list", "items"]),
        ],
        RecordType::Products => &[
            (
                "name",
                &["name", "service", "service name", "product", "product name"],
            ),
            (
                "supplier_name",
                &["supplier", "supplier name", "vendor", "vendor name"],
            ),
            (
                "unit_price",
                &["price", "unit price", "amount", "cost"],
            ),
            ("category", &["category", "service type", "type"]),
            (
                "payment_method",
                &["payment method", "payment terms", "payment", "terms"],
            ),
        ],
        RecordType::Suppliers => &[
            ("name", &["name", "supplier", "supplier name", "vendor"]),
            ("supplier_type", &["supplier type", "type", "category"]),
            (
                "contact_name",
                &["contact", "contact name", "contact person"],
            ),
            (
                "contact_phone",
                &["phone", "contact phone", "telephone", "tel"],
            ),
        ],
    }
}

/// Fields filled in when the source omits them entirely.
fn field_defaults(record_type: RecordType) -> &'static [(&'static str, &'static str)] {
    match record_type {
        RecordType::Orders => &[],
        RecordType::Products => &[("category", "other")],
        RecordType::Suppliers => &[("contact_name", ""), ("contact_phone", "")],
    }
}

fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', '-'], " ")
}

/// Renames source columns to the canonical field set and fills defaults.
pub fn map_fields(row: Row, record_type: RecordType) -> Row {
    let aliases = field_aliases(record_type);
    let mut mapped = Row::new();
    for (key, value) in row {
        let normalized = normalize_column(&key);
        let canonical = aliases
            .iter()
            .find(|(_, spellings)| spellings.contains(&normalized.as_str()))
            .map(|(canonical, _)| canonical.to_string());
        mapped.insert(canonical.unwrap_or(key), value);
    }
    for (field, default) in field_defaults(record_type) {
        mapped
            .entry(field.to_string())
            .or_insert_with(|| default.to_string());
    }
    mapped
}

/// Maps and validates raw rows. Rows missing a required field are dropped
/// with a diagnostic; zero surviving rows is an error, so the store is never
/// touched by an import that produced nothing.
pub fn validate(rows: Vec<Row>, record_type: RecordType) -> Result<Vec<Row>, ImportError> {
    let total = rows.len();
    let valid: Vec<Row> = rows
        .into_iter()
        .map(|row| map_fields(row, record_type))
        .filter(|row| {
            let missing: Vec<&&str> = required_fields(record_type)
                .iter()
                .filter(|field| row.get(**field).map(|v| v.trim().is_empty()).unwrap_or(true))
                .collect();
            if missing.is_empty() {
                true
            } else {
                tracing::warn!(?record_type, ?missing, "row dropped, required fields missing");
                false
            }
        })
        .collect();

    if valid.is_empty() {
        return Err(ImportError::Validation {
            record_type,
            reason: format!("all {} rows were missing required fields", total),
        });
    }
    Ok(valid)
}

/// Full pipeline for one record type: map, validate, convert. Rows whose
/// date or price fails to parse are dropped like validation misses.
pub fn build_records(rows: Vec<Row>, record_type: RecordType) -> Result<RecordBatch, ImportError> {
    let valid = validate(rows, record_type)?;
    let count = valid.len();

    let batch = match record_type {
        RecordType::Orders => {
            let orders: Vec<Order> = valid.into_iter().filter_map(row_to_order).collect();
            if orders.is_empty() {
                return Err(ImportError::Validation {
                    record_type,
                    reason: format!("none of the {} rows had a parsable departure date", count),
                });
            }
            RecordBatch::Orders(orders)
        }
        RecordType::Products => {
            let products: Vec<Product> = valid.into_iter().filter_map(row_to_product).collect();
            if products.is_empty() {
                return Err(ImportError::Validation {
                    record_type,
                    reason: format!("none of the {} rows had a parsable unit price", count),
                });
            }
            RecordBatch::Products(products)
        }
        RecordType::Suppliers => {
            let suppliers = valid.into_iter().map(row_to_supplier).collect();
            RecordBatch::Suppliers(suppliers)
        }
    };
    Ok(batch)
}

fn field(row: &Row, name: &str) -> String {
    row.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn row_to_order(row: Row) -> Option<Order> {
    let raw_date = field(&row, "departure_date");
    let Some(departure_date) = parse_date(&raw_date) else {
        tracing::warn!(date = %raw_date, "order row dropped, unparsable departure date");
        return None;
    };
    Some(Order {
        id: field(&row, "id"),
        customer_name: field(&row, "customer_name"),
        display_name: field(&row, "display_name"),
        departure_date,
        services: field(&row, "services"),
    })
}

fn row_to_product(row: Row) -> Option<Product> {
    let raw_price = field(&row, "unit_price");
    let unit_price = match parse_decimal(&raw_price) {
        Ok(price) if price >= 0.0 => price,
        _ => {
            tracing::warn!(price = %raw_price, "product row dropped, invalid unit price");
            return None;
        }
    };
    Some(Product {
        name: field(&row, "name"),
        supplier_name: field(&row, "supplier_name"),
        unit_price,
        category: field(&row, "category"),
        payment_method: field(&row, "payment_method"),
    })
}

fn row_to_supplier(row: Row) -> Supplier {
    Supplier {
        name: field(&row, "name"),
        supplier_type: field(&row, "supplier_type"),
        contact_name: field(&row, "contact_name"),
        contact_phone: field(&row, "contact_phone"),
    }
}

/// Derives a supplier directory when an import carried products but no
/// suppliers sheet: one entry per first-seen supplier name.
pub fn extract_suppliers_from_products(products: &[Product]) -> Vec<Supplier> {
    let mut suppliers: Vec<Supplier> = Vec::new();
    for product in products {
        if suppliers.iter().any(|s| s.name == product.supplier_name) {
            continue;
        }
        suppliers.push(Supplier {
            name: product.supplier_name.clone(),
            supplier_type: DEFAULT_SUPPLIER_TYPE.to_string(),
            contact_name: String::new(),
            contact_phone: String::new(),
        });
    }
    suppliers
}

/// Builds batches from per-type rows in a fixed apply order. A type that
/// fails validation becomes a warning while the surviving types still
/// apply; when a products batch survives without a suppliers batch, a
/// supplier directory is derived from the products.
pub fn assemble_batches(
    mut data_by_type: HashMap<RecordType, Vec<Row>>,
    warnings: &mut Vec<String>,
) -> Vec<RecordBatch> {
    let mut batches = Vec::new();
    for record_type in [RecordType::Products, RecordType::Suppliers, RecordType::Orders] {
        let Some(rows) = data_by_type.remove(&record_type) else {
            continue;
        };
        match build_records(rows, record_type) {
            Ok(batch) => batches.push(batch),
            Err(e) => warnings.push(e.to_string()),
        }
    }

    let has_suppliers = batches
        .iter()
        .any(|b| matches!(b, RecordBatch::Suppliers(_)));
    if !has_suppliers {
        let derived = batches.iter().find_map(|b| match b {
            RecordBatch::Products(products) => Some(extract_suppliers_from_products(products)),
            _ => None,
        });
        if let Some(suppliers) = derived {
            tracing::info!(count = suppliers.len(), "suppliers derived from products");
            batches.push(RecordBatch::Suppliers(suppliers));
        }
    }
    batches
}

pub fn parse_csv(content: &str) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ImportError::Parse(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Parse(e.to_string()))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn default_sheet_mapping() -> HashMap<usize, RecordType> {
    HashMap::from([
        (0, RecordType::Products),
        (1, RecordType::Suppliers),
        (2, RecordType::Orders),
    ])
}

/// Reads mapped worksheets out of an XLSX/ODS workbook. A missing or broken
/// sheet becomes a warning, not a failure; whatever parsed is returned.
pub fn parse_workbook(
    path: &Path,
    mapping: &HashMap<usize, RecordType>,
) -> Result<(HashMap<RecordType, Vec<Row>>, Vec<String>), ImportError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut data_by_type = HashMap::new();
    let mut warnings = Vec::new();
    for (&sheet_index, &record_type) in mapping {
        match workbook.worksheet_range_at(sheet_index) {
            None => warnings.push(format!(
                "worksheet {} ({:?}) not present in workbook",
                sheet_index, record_type
            )),
            Some(Err(e)) => warnings.push(format!(
                "worksheet {} ({:?}) could not be read: {}",
                sheet_index, record_type, e
            )),
            Some(Ok(range)) => {
                let mut rows_iter = range.rows();
                let Some(header_row) = rows_iter.next() else {
                    warnings.push(format!("worksheet {} ({:?}) is empty", sheet_index, record_type));
                    continue;
                };
                let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
                let rows: Vec<Row> = rows_iter
                    .map(|cells| {
                        headers
                            .iter()
                            .zip(cells.iter())
                            .filter(|(header, _)| !header.is_empty())
                            .map(|(header, cell)| (header.clone(), cell_to_string(cell)))
                            .collect()
                    })
                    .collect();
                data_by_type.insert(record_type, rows);
            }
        }
    }
    Ok((data_by_type, warnings))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_fields_translates_aliases_and_passes_unknown_through() {
        let mapped = map_fields(
            row(&[
                ("Service Name", "City Tour"),
                ("Vendor", "Acme"),
                ("Price", "100"),
                ("Payment Terms", "full payment"),
                ("internal_note", "keep me"),
            ]),
            RecordType::Products,
        );

        assert_eq!(mapped.get("name").map(String::as_str), Some("City Tour"));
        assert_eq!(mapped.get("supplier_name").map(String::as_str), Some("Acme"));
        assert_eq!(mapped.get("unit_price").map(String::as_str), Some("100"));
        assert_eq!(
            mapped.get("payment_method").map(String::as_str),
            Some("full payment")
        );
        assert_eq!(mapped.get("internal_note").map(String::as_str), Some("keep me"));
        // Defaultable field filled in.
        assert_eq!(mapped.get("category").map(String::as_str), Some("other"));
    }

    #[test]
    fn test_validate_drops_incomplete_rows() {
        let rows = vec![
            row(&[("name", "Acme"), ("type", "hotel")]),
            row(&[("name", ""), ("type", "hotel")]),
            row(&[("type", "airline")]),
        ];
        let valid = validate(rows, RecordType::Suppliers).unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].get("name").map(String::as_str), Some("Acme"));
    }

    #[test]
    fn test_validate_errors_when_nothing_survives() {
        let rows = vec![row(&[("name", "")]), row(&[("phone", "123")])];
        let err = validate(rows, RecordType::Suppliers).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Validation {
                record_type: RecordType::Suppliers,
                ..
            }
        ));
    }

    #[test]
    fn test_build_records_orders_parses_dates() {
        let rows = vec![
            row(&[
                ("Order No", "O1"),
                ("Customer", "Smith"),
                ("Title", "Smith trip"),
                ("Departure", "2025-11-10"),
                ("Services", "SvcA,SvcB"),
            ]),
            row(&[
                ("Order No", "O2"),
                ("Customer", "Jones"),
                ("Title", "Jones trip"),
                ("Departure", "not a date"),
                ("Services", "SvcA"),
            ]),
        ];
        let RecordBatch::Orders(orders) = build_records(rows, RecordType::Orders).unwrap() else {
            panic!("expected orders batch");
        };
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "O1");
        assert_eq!(orders[0].services, "SvcA,SvcB");
    }

    #[test]
    fn test_build_records_rejects_negative_prices() {
        let rows = vec![row(&[
            ("name", "SvcA"),
            ("supplier", "Acme"),
            ("price", "-5"),
            ("payment method", "full payment"),
        ])];
        assert!(build_records(rows, RecordType::Products).is_err());
    }

    #[test]
    fn test_extract_suppliers_first_seen_wins() {
        let products = vec![
            Product {
                name: "SvcA".to_string(),
                supplier_name: "Acme".to_string(),
                unit_price: 1.0,
                category: "tour".to_string(),
                payment_method: "full payment".to_string(),
            },
            Product {
                name: "SvcB".to_string(),
                supplier_name: "Acme".to_string(),
                unit_price: 2.0,
                category: "tour".to_string(),
                payment_method: "full payment".to_string(),
            },
            Product {
                name: "SvcC".to_string(),
                supplier_name: "Globex".to_string(),
                unit_price: 3.0,
                category: "tour".to_string(),
                payment_method: "full payment".to_string(),
            },
        ];
        let suppliers = extract_suppliers_from_products(&products);
        assert_eq!(suppliers.len(), 2);
        assert_eq!(suppliers[0].name, "Acme");
        assert_eq!(suppliers[0].supplier_type, "other");
        assert_eq!(suppliers[1].name, "Globex");
    }

    #[test]
    fn test_assemble_batches_failed_type_warns_while_others_apply() {
        let data_by_type = HashMap::from([
            (
                RecordType::Products,
                vec![row(&[
                    ("name", "SvcA"),
                    ("supplier", "Acme"),
                    ("price", "100"),
                    ("payment method", "full payment"),
                ])],
            ),
            // Every order row is missing its required fields.
            (RecordType::Orders, vec![row(&[("id", "")]), row(&[])]),
        ]);

        let mut warnings = Vec::new();
        let batches = assemble_batches(data_by_type, &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Orders"));
        assert!(batches
            .iter()
            .any(|b| matches!(b, RecordBatch::Products(p) if p.len() == 1)));
        assert!(!batches.iter().any(|b| matches!(b, RecordBatch::Orders(_))));
    }

    #[test]
    fn test_assemble_batches_derives_suppliers_when_none_survive() {
        let data_by_type = HashMap::from([(
            RecordType::Products,
            vec![row(&[
                ("name", "SvcA"),
                ("supplier", "Acme"),
                ("price", "100"),
                ("payment method", "full payment"),
            ])],
        )]);

        let mut warnings = Vec::new();
        let batches = assemble_batches(data_by_type, &mut warnings);

        let Some(RecordBatch::Suppliers(suppliers)) = batches
            .iter()
            .find(|b| matches!(b, RecordBatch::Suppliers(_)))
        else {
            panic!("expected derived suppliers batch");
        };
        assert_eq!(suppliers.len(), 1);
        assert_eq!(suppliers[0].name, "Acme");
        assert_eq!(suppliers[0].supplier_type, "other");
    }

    #[test]
    fn test_assemble_batches_keeps_supplied_suppliers_over_derivation() {
        let data_by_type = HashMap::from([
            (
                RecordType::Products,
                vec![row(&[
                    ("name", "SvcA"),
                    ("supplier", "Acme"),
                    ("price", "100"),
                    ("payment method", "full payment"),
                ])],
            ),
            (
                RecordType::Suppliers,
                vec![row(&[("name", "Acme"), ("type", "hotel")])],
            ),
        ]);

        let mut warnings = Vec::new();
        let batches = assemble_batches(data_by_type, &mut warnings);

        assert!(warnings.is_empty());
        let supplier_batches: Vec<_> = batches
            .iter()
            .filter_map(|b| match b {
                RecordBatch::Suppliers(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(supplier_batches.len(), 1);
        assert_eq!(supplier_batches[0][0].supplier_type, "hotel");
    }

    #[test]
    fn test_parse_csv() {
        let content = "Supplier,Type\nAcme,hotel\nGlobex,airline\n";
        let rows = parse_csv(content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Supplier").map(String::as_str), Some("Acme"));
        assert_eq!(rows[1].get("Type").map(String::as_str), Some("airline"));
    }

    #[test]
    fn test_default_sheet_mapping() {
        let mapping = default_sheet_mapping();
        assert_eq!(mapping.get(&0), Some(&RecordType::Products));
        assert_eq!(mapping.get(&1), Some(&RecordType::Suppliers));
        assert_eq!(mapping.get(&2), Some(&RecordType::Orders));
    }
}
