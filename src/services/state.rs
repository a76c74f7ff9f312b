use std::sync::{Arc, Mutex};

use crate::models::SeedData;
use crate::store::RecordStore;

pub struct AppState {
    pub store: Arc<Mutex<RecordStore>>,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn with_seed(seed: SeedData) -> Self {
        let mut store = RecordStore::new();
        store.replace_orders(seed.orders);
        store.replace_products(seed.products);
        store.replace_suppliers(seed.suppliers);
        AppState::new(store)
    }
}
