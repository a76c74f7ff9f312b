use chrono::NaiveDate;
use serde::Deserialize;
use tauri::State;

use crate::models::{PaymentTask, TaskStatus, TaskType, TaskView};
use crate::services::state::AppState;
use crate::store::DEFAULT_SUPPLIER_TYPE;
use crate::utils::{parse_date, today};

#[derive(Deserialize)]
pub struct NewTaskPayload {
    pub supplier_name: String,
    pub supplier_type: Option<String>,
    pub related_order: Option<String>,
    pub task_type: Option<TaskType>,
    pub description: String,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
}

#[tauri::command]
pub async fn get_tasks(status: String, state: State<'_, AppState>) -> Result<Vec<TaskView>, String> {
    let store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    Ok(store.task_views(&status))
}

#[tauri::command]
pub async fn create_task(
    payload: NewTaskPayload,
    state: State<'_, AppState>,
) -> Result<TaskView, String> {
    let (amount, due_date) = validate_payload(&payload)?;

    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    let booking = store.upsert_booking_for_supplier(
        payload.supplier_name.trim(),
        payload
            .supplier_type
            .as_deref()
            .unwrap_or(DEFAULT_SUPPLIER_TYPE),
        payload.related_order.as_deref().unwrap_or(""),
    );

    let task = PaymentTask {
        id: uuid::Uuid::new_v4().to_string(),
        task_type: payload.task_type.unwrap_or(TaskType::FullPayment),
        description: payload.description.trim().to_string(),
        amount_due: amount,
        due_date,
        status: TaskStatus::Pending,
        paid_at: None,
        invoice_link: None,
    };
    booking.tasks.push(task.clone());

    Ok(TaskView {
        id: task.id,
        task_type: task.task_type,
        description: task.description,
        amount_due: task.amount_due,
        due_date: task.due_date,
        status: task.status,
        paid_at: task.paid_at,
        invoice_link: task.invoice_link,
        supplier_name: booking.supplier_name.clone(),
        related_order: booking.related_order.clone(),
        supplier_type: booking.supplier_type.clone(),
    })
}

#[tauri::command]
pub async fn mark_task_paid(task_id: String, state: State<'_, AppState>) -> Result<(), String> {
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    // Unknown ids are a no-op by contract, not an error.
    if !store.mark_task_paid(&task_id, today()) {
        tracing::warn!(%task_id, "mark paid: task not found");
    }
    Ok(())
}

#[tauri::command]
pub async fn attach_invoice(
    task_id: String,
    link: String,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let mut store = state.store.lock().map_err(|_| "Store lock".to_string())?;
    if !store.attach_invoice(&task_id, &link) {
        tracing::warn!(%task_id, "attach invoice: task not found");
    }
    Ok(())
}

#[tauri::command]
pub async fn open_invoice_link(link: String) -> Result<(), String> {
    open::that(link).map_err(|e| e.to_string())?;
    Ok(())
}

fn validate_payload(payload: &NewTaskPayload) -> Result<(f64, NaiveDate), String> {
    if payload.supplier_name.trim().is_empty() {
        return Err("Supplier name is required".to_string());
    }
    if payload.description.trim().is_empty() {
        return Err("Description is required".to_string());
    }
    let amount = payload.amount.ok_or_else(|| "Amount is required".to_string())?;
    if amount < 0.0 {
        return Err("Amount must not be negative".to_string());
    }
    let raw_due = payload
        .due_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Due date is required".to_string())?;
    let due_date = parse_date(raw_due).ok_or_else(|| "Due date is not a valid date".to_string())?;
    Ok((amount, due_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewTaskPayload {
        NewTaskPayload {
            supplier_name: "Acme".to_string(),
            supplier_type: None,
            related_order: None,
            task_type: None,
            description: "Deposit for Smith trip".to_string(),
            amount: Some(300.0),
            due_date: Some("2025-11-03".to_string()),
        }
    }

    #[test]
    fn test_validate_payload_accepts_complete_input() {
        let (amount, due) = validate_payload(&payload()).unwrap();
        assert_eq!(amount, 300.0);
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
    }

    #[test]
    fn test_validate_payload_rejects_missing_fields() {
        let mut p = payload();
        p.supplier_name = "  ".to_string();
        assert!(validate_payload(&p).is_err());

        let mut p = payload();
        p.description = String::new();
        assert!(validate_payload(&p).is_err());

        let mut p = payload();
        p.amount = None;
        assert!(validate_payload(&p).is_err());

        let mut p = payload();
        p.due_date = None;
        assert!(validate_payload(&p).is_err());

        let mut p = payload();
        p.due_date = Some("tomorrow".to_string());
        assert!(validate_payload(&p).is_err());
    }

    #[test]
    fn test_validate_payload_rejects_negative_amount() {
        let mut p = payload();
        p.amount = Some(-1.0);
        assert!(validate_payload(&p).is_err());
    }
}
