use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub display_name: String,
    pub departure_date: NaiveDate,
    /// Comma-delimited service names; resolved against the product catalog
    /// only when bookings are generated.
    pub services: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub supplier_name: String,
    pub unit_price: f64,
    pub category: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub supplier_type: String,
    pub contact_name: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Deposit,
    FinalPayment,
    FullPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTask {
    pub id: String,
    pub task_type: TaskType,
    pub description: String,
    pub amount_due: f64,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub paid_at: Option<NaiveDate>,
    pub invoice_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostItem {
    pub service_name: String,
    pub amount: f64,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub supplier_name: String,
    pub supplier_type: String,
    pub related_order: String,
    pub status: String,
    pub cost_items: Vec<CostItem>,
    pub total_amount: f64,
    pub tasks: Vec<PaymentTask>,
}

/// One row of the flattened task list, enriched with the owning booking's
/// display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: String,
    pub task_type: TaskType,
    pub description: String,
    pub amount_due: f64,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub paid_at: Option<NaiveDate>,
    pub invoice_link: Option<String>,
    pub supplier_name: String,
    pub related_order: String,
    pub supplier_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Orders,
    Products,
    Suppliers,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub orders: usize,
    pub products: usize,
    pub suppliers: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTableCredentials {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
}
