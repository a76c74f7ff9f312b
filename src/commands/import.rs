use std::collections::HashMap;
use std::path::Path;

use tauri::State;

use crate::models::{ImportReport, RecordType, RemoteTableCredentials};
use crate::services::import::{
    assemble_batches, build_records, default_sheet_mapping, parse_csv, parse_workbook,
    ImportError, RecordBatch,
};
use crate::services::remote::fetch_remote_table;
use crate::services::state::AppState;
use crate::store::RecordStore;

#[tauri::command]
pub async fn pick_import_file() -> Result<Option<String>, String> {
    let selection = rfd::FileDialog::new()
        .add_filter("Tabular data", &["csv", "xlsx", "xls", "ods"])
        .pick_file()
        .map(|path| path.to_string_lossy().to_string());
    Ok(selection)
}

/// Imports a single-type tabular file (CSV). Parsing and validation finish
/// before the store is touched, so a failed import leaves it unchanged.
#[tauri::command]
pub async fn import_table_file(
    path: String,
    record_type: RecordType,
    state: State<'_, AppState>,
) -> Result<ImportReport, String> {
    let extension = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    if extension != "csv" {
        return Err(ImportError::UnsupportedFormat(extension).to_string());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
    let rows = parse_csv(&content).map_err(|e| e.to_string())?;
    let batch = build_records(rows, record_type).map_err(|e| e.to_string())?;

    let mut report = ImportReport::default();
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    apply_batch(&mut store, batch, &mut report);
    tracing::info!(?record_type, %path, "table file imported");
    Ok(report)
}

/// Imports a multi-sheet workbook. Worksheet position maps to record type,
/// defaulting to 0=products, 1=suppliers, 2=orders. Sheets that fail are
/// reported as warnings while the rest still apply; a products sheet with
/// no suppliers sheet gets a supplier directory derived from the products.
#[tauri::command]
pub async fn import_workbook(
    path: String,
    mapping: Option<HashMap<usize, RecordType>>,
    state: State<'_, AppState>,
) -> Result<ImportReport, String> {
    let mapping = mapping.unwrap_or_else(default_sheet_mapping);
    let (data_by_type, mut warnings) =
        parse_workbook(Path::new(&path), &mapping).map_err(|e| e.to_string())?;

    let batches = assemble_batches(data_by_type, &mut warnings);
    if batches.is_empty() {
        return Err(format!(
            "Workbook import failed: {}",
            warnings.join("; ")
        ));
    }

    let mut report = ImportReport {
        warnings,
        ..ImportReport::default()
    };
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    for batch in batches {
        apply_batch(&mut store, batch, &mut report);
    }
    tracing::info!(
        %path,
        orders = report.orders,
        products = report.products,
        suppliers = report.suppliers,
        "workbook imported"
    );
    Ok(report)
}

#[tauri::command]
pub async fn import_remote_table(
    credentials: RemoteTableCredentials,
    record_type: RecordType,
    state: State<'_, AppState>,
) -> Result<ImportReport, String> {
    let rows = fetch_remote_table(&credentials)
        .await
        .map_err(|e| e.to_string())?;
    let batch = build_records(rows, record_type).map_err(|e| e.to_string())?;

    let mut report = ImportReport::default();
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    apply_batch(&mut store, batch, &mut report);
    tracing::info!(?record_type, table = %credentials.table, "remote table imported");
    Ok(report)
}

fn apply_batch(store: &mut RecordStore, batch: RecordBatch, report: &mut ImportReport) {
    match batch {
        RecordBatch::Orders(orders) => {
            report.orders = orders.len();
            store.replace_orders(orders);
        }
        RecordBatch::Products(products) => {
            report.products = products.len();
            store.replace_products(products);
        }
        RecordBatch::Suppliers(suppliers) => {
            report.suppliers = suppliers.len();
            store.replace_suppliers(suppliers);
        }
    }
}
