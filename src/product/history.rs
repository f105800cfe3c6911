// Purchase history per buyer

use crate::protocol::{BuyerId, ItemId};
use dashmap::DashMap;

/// Items each buyer has purchased, oldest first
pub struct PurchaseHistory {
    purchases: DashMap<BuyerId, Vec<ItemId>>,
}

impl PurchaseHistory {
    pub fn new() -> Self {
        Self {
            purchases: DashMap::new(),
        }
    }

    pub fn record(&self, buyer_id: BuyerId, item_id: ItemId) {
        self.purchases.entry(buyer_id).or_default().push(item_id);
    }

    pub fn get(&self, buyer_id: BuyerId) -> Vec<ItemId> {
        self.purchases
            .get(&buyer_id)
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl Default for PurchaseHistory {
    fn default() -> Self {
        Self::new()
    }
}
