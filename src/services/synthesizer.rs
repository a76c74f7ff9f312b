use crate::models::{Booking, Order, Product, Supplier};
use crate::services::terms::expand_payment_method;
use crate::store::{cost_item, BOOKING_STATUS_IN_PROGRESS, DEFAULT_SUPPLIER_TYPE};

/// Per-supplier accumulator while scanning an order's services left to right.
struct SupplierBasket<'a> {
    supplier_name: String,
    total_amount: f64,
    products: Vec<&'a Product>,
}

/// Turns one order into supplier-grouped bookings with expanded payment
/// tasks. Pure: the caller appends the result to the store. An unknown
/// order id yields an empty list; callers detect failure by length.
pub fn synthesize_bookings(
    order_id: &str,
    orders: &[Order],
    products: &[Product],
    suppliers: &[Supplier],
) -> Vec<Booking> {
    let Some(order) = orders.iter().find(|o| o.id == order_id) else {
        tracing::warn!(order_id, "order not found, no bookings generated");
        return Vec::new();
    };

    let mut baskets: Vec<SupplierBasket> = Vec::new();
    for raw_name in order.services.split(',') {
        let service_name = raw_name.trim();
        // First match wins; duplicate product names shadow silently.
        let Some(product) = products.iter().find(|p| p.name.trim() == service_name) else {
            tracing::warn!(
                service = raw_name,
                order = %order.id,
                "service has no matching product, skipped"
            );
            continue;
        };

        match baskets
            .iter_mut()
            .find(|b| b.supplier_name == product.supplier_name)
        {
            Some(basket) => {
                basket.total_amount += product.unit_price;
                basket.products.push(product);
            }
            None => baskets.push(SupplierBasket {
                supplier_name: product.supplier_name.clone(),
                total_amount: product.unit_price,
                products: vec![product],
            }),
        }
    }

    baskets
        .into_iter()
        .map(|basket| {
            let supplier_type = suppliers
                .iter()
                .find(|s| s.name == basket.supplier_name)
                .map(|s| s.supplier_type.clone())
                .unwrap_or_else(|| DEFAULT_SUPPLIER_TYPE.to_string());

            let mut cost_items = Vec::new();
            let mut tasks = Vec::new();
            for product in &basket.products {
                cost_items.push(cost_item(
                    &product.name,
                    product.unit_price,
                    &basket.supplier_name,
                ));
                // Each cost item is expanded against its own unit price,
                // not the basket total.
                tasks.extend(expand_payment_method(
                    &product.payment_method,
                    product.unit_price,
                    order.departure_date,
                ));
            }

            Booking {
                id: uuid::Uuid::new_v4().to_string(),
                supplier_name: basket.supplier_name,
                supplier_type,
                related_order: order.display_name.clone(),
                status: BOOKING_STATUS_IN_PROGRESS.to_string(),
                cost_items,
                total_amount: basket.total_amount,
                tasks,
            }
        })
        .collect()
}
