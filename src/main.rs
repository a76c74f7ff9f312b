#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod models;
mod services;
mod store;
mod utils;

use tauri::Manager;

use crate::models::SeedData;
use crate::services::state::AppState;

fn main() {
    tracing_subscriber::fmt::init();

    tauri::Builder::default()
        .setup(|app| {
            let seed = load_seed_data()?;
            tracing::info!(
                orders = seed.orders.len(),
                products = seed.products.len(),
                suppliers = seed.suppliers.len(),
                "seed data loaded"
            );
            app.manage(AppState::with_seed(seed));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::tasks::get_tasks,
            commands::tasks::create_task,
            commands::tasks::mark_task_paid,
            commands::tasks::attach_invoice,
            commands::tasks::open_invoice_link,
            commands::bookings::get_orders,
            commands::bookings::get_bookings,
            commands::bookings::generate_bookings,
            commands::import::pick_import_file,
            commands::import::import_table_file,
            commands::import::import_workbook,
            commands::import::import_remote_table,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn load_seed_data() -> anyhow::Result<SeedData> {
    let seed = serde_json::from_str(include_str!("../data/seed.json"))?;
    Ok(seed)
}
