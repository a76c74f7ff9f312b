use chrono::NaiveDate;

use crate::models::{Booking, CostItem, Order, PaymentTask, Product, Supplier, TaskStatus, TaskView};

pub const BOOKING_STATUS_IN_PROGRESS: &str = "in_progress";
pub const DEFAULT_SUPPLIER_TYPE: &str = "other";

/// Session-scoped record store. All reads and writes go through the methods
/// below; orders, products and suppliers are replaced wholesale on re-import,
/// bookings only ever grow.
#[derive(Debug, Default)]
pub struct RecordStore {
    orders: Vec<Order>,
    products: Vec<Product>,
    suppliers: Vec<Supplier>,
    bookings: Vec<Booking>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn replace_orders(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn replace_suppliers(&mut self, suppliers: Vec<Supplier>) {
        self.suppliers = suppliers;
    }

    pub fn append_bookings(&mut self, bookings: Vec<Booking>) {
        self.bookings.extend(bookings);
    }

    /// Finds the booking for a supplier by exact name match, creating one
    /// with the given defaults when none exists yet. Match key is the
    /// supplier name; first match wins.
    pub fn upsert_booking_for_supplier(
        &mut self,
        supplier_name: &str,
        supplier_type: &str,
        related_order: &str,
    ) -> &mut Booking {
        let idx = self
            .bookings
            .iter()
            .position(|b| b.supplier_name == supplier_name);

        let idx = match idx {
            Some(idx) => idx,
            None => {
                self.bookings.push(Booking {
                    id: uuid::Uuid::new_v4().to_string(),
                    supplier_name: supplier_name.to_string(),
                    supplier_type: supplier_type.to_string(),
                    related_order: related_order.to_string(),
                    status: BOOKING_STATUS_IN_PROGRESS.to_string(),
                    cost_items: Vec::new(),
                    total_amount: 0.0,
                    tasks: Vec::new(),
                });
                self.bookings.len() - 1
            }
        };
        &mut self.bookings[idx]
    }

    /// Sets a task to paid and stamps the payment date. Re-marking an
    /// already-paid task re-stamps the date. Returns false when the id is
    /// unknown; that is a no-op, not an error.
    pub fn mark_task_paid(&mut self, task_id: &str, paid_on: NaiveDate) -> bool {
        match self.find_task_mut(task_id) {
            Some(task) => {
                task.status = TaskStatus::Paid;
                task.paid_at = Some(paid_on);
                true
            }
            None => false,
        }
    }

    /// Attaches an invoice link to a task. No validation on the link format.
    pub fn attach_invoice(&mut self, task_id: &str, link: &str) -> bool {
        match self.find_task_mut(task_id) {
            Some(task) => {
                task.invoice_link = Some(link.to_string());
                true
            }
            None => false,
        }
    }

    fn find_task_mut(&mut self, task_id: &str) -> Option<&mut PaymentTask> {
        self.bookings
            .iter_mut()
            .flat_map(|b| b.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }

    /// Flattens all bookings' tasks into one display list, filtered by
    /// status ("pending" | "paid"; anything else means all) and sorted
    /// ascending by due date. The sort is stable so ties keep flatten order.
    pub fn task_views(&self, status_filter: &str) -> Vec<TaskView> {
        let wanted = match status_filter {
            "pending" => Some(TaskStatus::Pending),
            "paid" => Some(TaskStatus::Paid),
            _ => None,
        };

        let mut views: Vec<TaskView> = self
            .bookings
            .iter()
            .flat_map(|booking| {
                booking.tasks.iter().map(|task| TaskView {
                    id: task.id.clone(),
                    task_type: task.task_type,
                    description: task.description.clone(),
                    amount_due: task.amount_due,
                    due_date: task.due_date,
                    status: task.status,
                    paid_at: task.paid_at,
                    invoice_link: task.invoice_link.clone(),
                    supplier_name: booking.supplier_name.clone(),
                    related_order: booking.related_order.clone(),
                    supplier_type: booking.supplier_type.clone(),
                })
            })
            .filter(|view| wanted.map(|s| view.status == s).unwrap_or(true))
            .collect();

        views.sort_by_key(|view| view.due_date);
        views
    }

    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }
}

pub fn cost_item(service_name: &str, amount: f64, source: &str) -> CostItem {
    CostItem {
        service_name: service_name.to_string(),
        amount,
        source: source.to_string(),
    }
}
