use tauri::State;

use crate::models::{Booking, Order};
use crate::services::state::AppState;
use crate::services::synthesizer::synthesize_bookings;

#[tauri::command]
pub async fn get_orders(state: State<'_, AppState>) -> Result<Vec<Order>, String> {
    let store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    Ok(store.orders().to_vec())
}

#[tauri::command]
pub async fn get_bookings(state: State<'_, AppState>) -> Result<Vec<Booking>, String> {
    let store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    Ok(store.bookings().to_vec())
}

#[tauri::command]
pub async fn generate_bookings(
    order_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<Booking>, String> {
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    let bookings = synthesize_bookings(
        &order_id,
        store.orders(),
        store.products(),
        store.suppliers(),
    );
    if bookings.is_empty() {
        return Err(format!(
            "No bookings generated: order '{}' not found or none of its services resolved",
            order_id
        ));
    }

    tracing::info!(%order_id, count = bookings.len(), "bookings generated");
    store.append_bookings(bookings.clone());
    Ok(bookings)
}
