// Inventory store for the Product Database
// Item records plus owning-seller and category indexes

use crate::error::{MarketError, MarketResult};
use crate::protocol::{Feedback, Item, ItemId, NewItem, SellerId, Thumbs};
use dashmap::DashMap;
use tracing::info;

pub const MAX_ITEM_NAME_LEN: usize = 32;
pub const MAX_KEYWORDS: usize = 5;
pub const MAX_KEYWORD_LEN: usize = 8;

/// Check the keyword limits shared by listings and search queries
pub fn validate_keywords(keywords: &[String]) -> MarketResult<()> {
    if keywords.len() > MAX_KEYWORDS {
        return Err(MarketError::Validation(format!(
            "at most {} keywords allowed, got {}",
            MAX_KEYWORDS,
            keywords.len()
        )));
    }
    for keyword in keywords {
        let len = keyword.chars().count();
        if len == 0 || len > MAX_KEYWORD_LEN {
            return Err(MarketError::Validation(format!(
                "keyword {:?} must be 1 to {} characters",
                keyword, MAX_KEYWORD_LEN
            )));
        }
    }
    Ok(())
}

/// Trim keywords and cut each to the length limit, as the frontends do for client input
pub fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|keyword| keyword.trim().chars().take(MAX_KEYWORD_LEN).collect())
        .collect()
}

fn validate_price(price: f64) -> MarketResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(MarketError::Validation(format!(
            "price must be a non-negative number, got {}",
            price
        )));
    }
    Ok(())
}

fn validate_new_item(item: &NewItem) -> MarketResult<u32> {
    let name_len = item.name.chars().count();
    if name_len == 0 || name_len > MAX_ITEM_NAME_LEN {
        return Err(MarketError::Validation(format!(
            "item name must be 1 to {} characters",
            MAX_ITEM_NAME_LEN
        )));
    }
    validate_keywords(&item.keywords)?;
    validate_price(item.price)?;

    u32::try_from(item.quantity).map_err(|_| {
        MarketError::Validation(format!(
            "quantity must be between 0 and {}, got {}",
            u32::MAX,
            item.quantity
        ))
    })
}

fn item_not_found(item_id: ItemId) -> MarketError {
    MarketError::NotFound(format!("item {}", item_id))
}

/// Concurrent item table.
/// Each item is mutated under its own shard lock; indexes only ever grow.
pub struct Inventory {
    items: DashMap<ItemId, Item>,
    by_seller: DashMap<SellerId, Vec<ItemId>>,
    by_category: DashMap<i32, Vec<ItemId>>,

    /// Last sequence number handed out per category
    sequences: DashMap<i32, u64>,
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            by_seller: DashMap::new(),
            by_category: DashMap::new(),
            sequences: DashMap::new(),
        }
    }

    /// List a new item and return its server-assigned id
    pub fn register(&self, seller_id: SellerId, new_item: NewItem) -> MarketResult<ItemId> {
        let quantity = validate_new_item(&new_item)?;

        let seq = {
            let mut last = self.sequences.entry(new_item.category).or_insert(0);
            *last += 1;
            *last
        };
        let item_id = ItemId::new(new_item.category, seq);

        let item = Item {
            item_id,
            name: new_item.name,
            category: new_item.category,
            keywords: new_item.keywords,
            condition: new_item.condition,
            price: new_item.price,
            quantity,
            feedback: Feedback::default(),
            seller_id,
        };
        self.items.insert(item_id, item);
        self.by_seller.entry(seller_id).or_default().push(item_id);
        self.by_category.entry(item_id.category).or_default().push(item_id);

        info!(item_id = %item_id, seller_id = %seller_id, quantity = quantity, "Item registered");
        Ok(item_id)
    }

    pub fn get(&self, item_id: ItemId) -> MarketResult<Item> {
        self.items
            .get(&item_id)
            .map(|item| item.clone())
            .ok_or_else(|| item_not_found(item_id))
    }

    /// Units currently available for an item
    pub fn available(&self, item_id: ItemId) -> MarketResult<u32> {
        self.items
            .get(&item_id)
            .map(|item| item.quantity)
            .ok_or_else(|| item_not_found(item_id))
    }

    pub fn change_price(&self, item_id: ItemId, seller_id: SellerId, new_price: f64) -> MarketResult<()> {
        let mut item = self.owned_item(item_id, seller_id)?;
        validate_price(new_price)?;
        item.price = new_price;
        Ok(())
    }

    /// Add `delta` (possibly negative) units; returns the new quantity
    pub fn update_units(&self, item_id: ItemId, seller_id: SellerId, delta: i64) -> MarketResult<u32> {
        let mut item = self.owned_item(item_id, seller_id)?;

        let updated = i64::from(item.quantity)
            .checked_add(delta)
            .ok_or_else(|| MarketError::Validation(format!("delta {} is out of range", delta)))?;
        if updated < 0 {
            return Err(MarketError::InsufficientQuantity {
                requested: delta.unsigned_abs(),
                available: u64::from(item.quantity),
            });
        }
        item.quantity = u32::try_from(updated).map_err(|_| {
            MarketError::Validation(format!("quantity cannot exceed {}", u32::MAX))
        })?;
        Ok(item.quantity)
    }

    /// All items listed by `seller_id`, including sold-out ones, in id order
    pub fn items_for_seller(&self, seller_id: SellerId) -> Vec<Item> {
        let ids = self
            .by_seller
            .get(&seller_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        self.collect(ids)
    }

    /// Search candidates: the whole table, or one category through its index
    pub fn candidates(&self, category: Option<i32>) -> Vec<Item> {
        match category {
            Some(category) => {
                let ids = self
                    .by_category
                    .get(&category)
                    .map(|ids| ids.clone())
                    .unwrap_or_default();
                self.collect(ids)
            }
            None => self.items.iter().map(|entry| entry.value().clone()).collect(),
        }
    }

    /// Count one vote on the item; returns the owning seller
    pub fn record_feedback(&self, item_id: ItemId, thumbs: Thumbs) -> MarketResult<SellerId> {
        let mut item = self
            .items
            .get_mut(&item_id)
            .ok_or_else(|| item_not_found(item_id))?;
        item.feedback.record(thumbs);
        Ok(item.seller_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn owned_item(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
    ) -> MarketResult<dashmap::mapref::one::RefMut<'_, ItemId, Item>> {
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or_else(|| item_not_found(item_id))?;
        if item.seller_id != seller_id {
            return Err(MarketError::NotOwner(format!("item {}", item_id)));
        }
        Ok(item)
    }

    fn collect(&self, mut ids: Vec<ItemId>) -> Vec<Item> {
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.items.get(&id).map(|item| item.clone()))
            .collect()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::{Condition, PrincipalId};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn laptop() -> NewItem {
        NewItem {
            name: "Laptop".into(),
            category: 1,
            keywords: vec!["electronics".into(), "computer".into()],
            condition: Condition::New,
            price: 999.99,
            quantity: 10,
        }
    }

    fn widget(category: i32, quantity: i64) -> NewItem {
        NewItem {
            name: "Widget".into(),
            category,
            keywords: vec!["widget".into()],
            condition: Condition::Used,
            price: 5.0,
            quantity,
        }
    }

    #[test]
    fn test_register_then_get() {
        let inventory = Inventory::new();
        let seller = PrincipalId(1);
        let mut input = laptop();
        input.keywords = vec!["laptops".into(), "computer".into()];

        let item_id = inventory.register(seller, input.clone()).unwrap();
        assert_eq!(item_id, ItemId::new(1, 1));

        let item = inventory.get(item_id).unwrap();
        assert_eq!(item.name, input.name);
        assert_eq!(item.category, 1);
        assert_eq!(item.keywords, input.keywords);
        assert_eq!(item.condition, Condition::New);
        assert_eq!(item.price, 999.99);
        assert_eq!(item.quantity, 10);
        assert_eq!(item.feedback, Feedback::default());
        assert_eq!(item.seller_id, seller);
    }

    #[test]
    fn test_keyword_limits() {
        let inventory = Inventory::new();
        // "electronics" is longer than 8 characters
        let err = inventory.register(PrincipalId(1), laptop()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let mut six = widget(1, 1);
        six.keywords = (0..6).map(|i| format!("k{i}")).collect();
        assert!(inventory.register(PrincipalId(1), six).is_err());
    }

    #[test]
    fn test_normalize_keywords() {
        let keywords = normalize_keywords(vec![" electronics ".into(), "computer".into()]);
        assert_eq!(keywords, vec!["electron".to_string(), "computer".to_string()]);

        let inventory = Inventory::new();
        let mut input = laptop();
        input.keywords = normalize_keywords(input.keywords);
        assert!(inventory.register(PrincipalId(1), input).is_ok());
    }

    #[test]
    fn test_item_validation() {
        let inventory = Inventory::new();

        let mut long_name = widget(1, 1);
        long_name.name = "x".repeat(33);
        assert!(inventory.register(PrincipalId(1), long_name).is_err());

        let mut negative_price = widget(1, 1);
        negative_price.price = -1.0;
        assert!(inventory.register(PrincipalId(1), negative_price).is_err());

        assert!(inventory.register(PrincipalId(1), widget(1, -4)).is_err());
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_ids_are_per_category() {
        let inventory = Inventory::new();
        let a = inventory.register(PrincipalId(1), widget(1, 1)).unwrap();
        let b = inventory.register(PrincipalId(1), widget(2, 1)).unwrap();
        let c = inventory.register(PrincipalId(2), widget(1, 1)).unwrap();

        assert_eq!(a, ItemId::new(1, 1));
        assert_eq!(b, ItemId::new(2, 1));
        assert_eq!(c, ItemId::new(1, 2));
    }

    #[test]
    fn test_only_owner_mutates() {
        let inventory = Inventory::new();
        let id = inventory.register(PrincipalId(1), widget(3, 4)).unwrap();

        let err = inventory.change_price(id, PrincipalId(2), 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        let err = inventory.update_units(id, PrincipalId(2), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        inventory.change_price(id, PrincipalId(1), 7.5).unwrap();
        assert_eq!(inventory.get(id).unwrap().price, 7.5);

        let err = inventory.change_price(ItemId::new(3, 99), PrincipalId(1), 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_quantity_never_negative() {
        let inventory = Inventory::new();
        let id = inventory.register(PrincipalId(1), widget(1, 10)).unwrap();

        assert_eq!(inventory.update_units(id, PrincipalId(1), -3).unwrap(), 7);
        let err = inventory.update_units(id, PrincipalId(1), -8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientQuantity);
        assert_eq!(inventory.get(id).unwrap().quantity, 7);

        assert_eq!(inventory.update_units(id, PrincipalId(1), -7).unwrap(), 0);
        // Sold-out items stay visible to their seller
        assert_eq!(inventory.items_for_seller(PrincipalId(1)).len(), 1);
    }

    #[test]
    fn test_feedback_returns_owner() {
        let inventory = Inventory::new();
        let id = inventory.register(PrincipalId(5), widget(1, 1)).unwrap();
        assert_eq!(inventory.record_feedback(id, Thumbs::Down).unwrap(), PrincipalId(5));
        assert_eq!(inventory.get(id).unwrap().feedback, Feedback { up: 0, down: 1 });
    }

    #[test]
    fn test_concurrent_registration_in_one_category() {
        let inventory = Arc::new(Inventory::new());
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let inventory = inventory.clone();
                std::thread::spawn(move || inventory.register(PrincipalId(1), widget(7, 1)).unwrap())
            })
            .collect();

        let ids: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(inventory.candidates(Some(7)).len(), 100);
    }
}
