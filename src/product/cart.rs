// Cart store for the Product Database
// Per-buyer carts, keyed by buyer id and independent of any session

use crate::error::{MarketError, MarketResult};
use crate::protocol::{BuyerId, CartLine, ItemId};
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Check a client-supplied cart quantity; zero and negatives are rejected
pub fn positive_quantity(qty: i64) -> MarketResult<u32> {
    if qty <= 0 {
        return Err(MarketError::InvalidQuantity(format!(
            "quantity must be positive, got {}",
            qty
        )));
    }
    u32::try_from(qty)
        .map_err(|_| MarketError::InvalidQuantity(format!("quantity {} is too large", qty)))
}

/// One buyer's cart.
/// `saved` is set by SaveCart and consumed by the next release.
#[derive(Debug, Clone, Default)]
struct Cart {
    lines: BTreeMap<ItemId, u32>,
    saved: bool,
}

pub struct CartStore {
    carts: DashMap<BuyerId, Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            carts: DashMap::new(),
        }
    }

    /// Add units of an item, creating the cart on first use.
    /// `available` is the item's stock at the time of the call; nothing is reserved.
    pub fn add(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64, available: u32) -> MarketResult<()> {
        let qty = positive_quantity(qty)?;
        let mut cart = self.carts.entry(buyer_id).or_default();

        let held = cart.lines.get(&item_id).copied().unwrap_or(0);
        let wanted = u64::from(held) + u64::from(qty);
        if wanted > u64::from(available) {
            return Err(MarketError::InsufficientQuantity {
                requested: wanted,
                available: u64::from(available),
            });
        }

        // wanted <= available, so it fits in u32
        cart.lines.insert(item_id, wanted as u32);
        Ok(())
    }

    /// Take units back out; removing everything held drops the line
    pub fn remove(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        let qty = positive_quantity(qty)?;
        let not_in_cart = || MarketError::NotFound(format!("item {} in cart of buyer {}", item_id, buyer_id));

        let mut cart = self.carts.get_mut(&buyer_id).ok_or_else(not_in_cart)?;
        let held = cart.lines.get(&item_id).copied().ok_or_else(not_in_cart)?;

        if qty > held {
            return Err(MarketError::InvalidQuantity(format!(
                "cannot remove {} units, cart holds {}",
                qty, held
            )));
        }
        if qty == held {
            cart.lines.remove(&item_id);
        } else {
            cart.lines.insert(item_id, held - qty);
        }
        Ok(())
    }

    /// Keep the cart, including later changes, across the next logout
    pub fn save(&self, buyer_id: BuyerId) {
        self.carts.entry(buyer_id).or_default().saved = true;
    }

    /// Empty the cart whether or not it was saved
    pub fn clear(&self, buyer_id: BuyerId) {
        self.carts.remove(&buyer_id);
    }

    /// End of a login period: an unsaved cart is emptied, a saved one is kept
    /// and must be saved again to survive the following logout.
    /// Returns whether the cart was kept.
    pub fn release(&self, buyer_id: BuyerId) -> bool {
        let kept = match self.carts.get_mut(&buyer_id) {
            Some(mut cart) => {
                let kept = cart.saved;
                if !kept {
                    cart.lines.clear();
                }
                cart.saved = false;
                kept
            }
            None => false,
        };
        self.carts.remove_if(&buyer_id, |_, cart| cart.lines.is_empty());
        kept
    }

    /// Cart lines in item id order
    pub fn display(&self, buyer_id: BuyerId) -> Vec<CartLine> {
        self.carts
            .get(&buyer_id)
            .map(|cart| {
                cart.lines
                    .iter()
                    .map(|(&item_id, &quantity)| CartLine { item_id, quantity })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::PrincipalId;

    const BUYER: BuyerId = PrincipalId(1);

    fn lines(store: &CartStore) -> Vec<(u64, u32)> {
        store
            .display(BUYER)
            .into_iter()
            .map(|line| (line.item_id.seq, line.quantity))
            .collect()
    }

    #[test]
    fn test_add_accumulates_and_remove_reduces() {
        let store = CartStore::new();
        let item = ItemId::new(1, 1);

        store.add(BUYER, item, 2, 10).unwrap();
        store.add(BUYER, item, 3, 10).unwrap();
        assert_eq!(lines(&store), vec![(1, 5)]);

        store.remove(BUYER, item, 4).unwrap();
        assert_eq!(lines(&store), vec![(1, 1)]);

        store.remove(BUYER, item, 1).unwrap();
        assert!(store.display(BUYER).is_empty());
    }

    #[test]
    fn test_add_checks_availability() {
        let store = CartStore::new();
        let item = ItemId::new(1, 1);

        store.add(BUYER, item, 4, 5).unwrap();
        let err = store.add(BUYER, item, 2, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientQuantity);
        assert_eq!(lines(&store), vec![(1, 4)]);
    }

    #[test]
    fn test_quantity_rules() {
        let store = CartStore::new();
        let item = ItemId::new(1, 1);

        assert_eq!(store.add(BUYER, item, 0, 5).unwrap_err().kind(), ErrorKind::InvalidQuantity);
        assert_eq!(store.add(BUYER, item, -1, 5).unwrap_err().kind(), ErrorKind::InvalidQuantity);

        assert_eq!(store.remove(BUYER, item, 1).unwrap_err().kind(), ErrorKind::NotFound);
        store.add(BUYER, item, 2, 5).unwrap();
        assert_eq!(store.remove(BUYER, item, 3).unwrap_err().kind(), ErrorKind::InvalidQuantity);
    }

    #[test]
    fn test_release_without_save_empties() {
        let store = CartStore::new();
        store.add(BUYER, ItemId::new(1, 1), 1, 5).unwrap();
        assert!(!store.release(BUYER));
        assert!(store.display(BUYER).is_empty());
    }

    #[test]
    fn test_release_keeps_changes_after_save() {
        let store = CartStore::new();
        store.add(BUYER, ItemId::new(1, 1), 1, 5).unwrap();
        store.save(BUYER);
        store.add(BUYER, ItemId::new(1, 2), 1, 5).unwrap();

        assert!(store.release(BUYER));
        assert_eq!(lines(&store), vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn test_save_lasts_one_login_period() {
        let store = CartStore::new();
        store.add(BUYER, ItemId::new(1, 1), 1, 5).unwrap();
        store.save(BUYER);
        store.release(BUYER);

        store.add(BUYER, ItemId::new(1, 2), 1, 5).unwrap();
        assert!(!store.release(BUYER));
        assert!(store.display(BUYER).is_empty());
    }

    #[test]
    fn test_clear_ignores_save() {
        let store = CartStore::new();
        store.add(BUYER, ItemId::new(1, 1), 1, 5).unwrap();
        store.save(BUYER);
        store.clear(BUYER);
        store.release(BUYER);
        assert!(store.display(BUYER).is_empty());
    }

    #[test]
    fn test_carts_are_per_buyer() {
        let store = CartStore::new();
        store.add(BUYER, ItemId::new(1, 1), 1, 5).unwrap();
        assert!(store.display(PrincipalId(2)).is_empty());
    }
}
