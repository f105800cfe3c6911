// Product Database service
// Items, search, carts and purchase history; relays item feedback to the Customer Database

pub mod cart;
pub mod client;
pub mod history;
pub mod inventory;
pub mod search;

pub use cart::CartStore;
pub use client::RemoteProductDb;
pub use history::PurchaseHistory;
pub use inventory::Inventory;

use crate::customer::CustomerApi;
use crate::error::{MarketError, MarketResult};
use crate::network::Service;
use crate::protocol::{
    BuyerId, CartLine, Item, ItemId, NewItem, ProductRequest, Response, SellerId, Thumbs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Operations offered by the Product Database, whether in-process or across TCP
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn register_item(&self, seller_id: SellerId, item: NewItem) -> MarketResult<ItemId>;

    async fn change_item_price(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        new_price: f64,
    ) -> MarketResult<()>;

    async fn update_units_for_sale(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        delta: i64,
    ) -> MarketResult<()>;

    async fn display_items_for_sale(&self, seller_id: SellerId) -> MarketResult<Vec<Item>>;

    async fn search_items_for_sale(
        &self,
        category: Option<i32>,
        keywords: Vec<String>,
    ) -> MarketResult<Vec<Item>>;

    async fn get_item(&self, item_id: ItemId) -> MarketResult<Item>;

    async fn add_item_to_cart(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64) -> MarketResult<()>;

    async fn remove_item_from_cart(
        &self,
        buyer_id: BuyerId,
        item_id: ItemId,
        qty: i64,
    ) -> MarketResult<()>;

    async fn save_cart(&self, buyer_id: BuyerId) -> MarketResult<()>;

    async fn clear_cart(&self, buyer_id: BuyerId) -> MarketResult<()>;

    async fn display_cart(&self, buyer_id: BuyerId) -> MarketResult<Vec<CartLine>>;

    /// Close the buyer's login period: empty the cart unless it was saved during it
    async fn release_cart(&self, buyer_id: BuyerId) -> MarketResult<()>;

    /// Count a vote on the item and relay it to the owning seller's rating
    async fn provide_feedback(&self, item_id: ItemId, thumbs: Thumbs) -> MarketResult<()>;

    async fn record_purchase(&self, buyer_id: BuyerId, item_id: ItemId) -> MarketResult<()>;

    async fn purchase_history(&self, buyer_id: BuyerId) -> MarketResult<Vec<ItemId>>;
}

/// The Product Database: inventory, carts and purchase history
pub struct ProductDb {
    inventory: Inventory,
    carts: CartStore,
    history: PurchaseHistory,

    /// Where seller ratings and purchase counters live
    customer: Arc<dyn CustomerApi>,
}

impl ProductDb {
    pub fn new(customer: Arc<dyn CustomerApi>) -> Self {
        info!("Initializing Product Database");

        Self {
            inventory: Inventory::new(),
            carts: CartStore::new(),
            history: PurchaseHistory::new(),
            customer,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn search(&self, category: Option<i32>, keywords: &[String]) -> MarketResult<Vec<Item>> {
        inventory::validate_keywords(keywords)?;
        let results = search::rank(self.inventory.candidates(category), keywords, category.is_some());
        debug!(category = ?category, matches = results.len(), "Search completed");
        Ok(results)
    }

    fn add_to_cart(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        let available = self.inventory.available(item_id)?;
        self.carts.add(buyer_id, item_id, qty, available)
    }

    async fn relay_feedback(&self, item_id: ItemId, thumbs: Thumbs) -> MarketResult<()> {
        let seller_id = self.inventory.record_feedback(item_id, thumbs)?;

        // The item counter is already updated; there is nothing to roll back
        if let Err(e) = self.customer.record_feedback(seller_id, thumbs).await {
            warn!(
                item_id = %item_id,
                seller_id = %seller_id,
                error = %e,
                "Seller rating update failed after item feedback was recorded"
            );
            return Err(MarketError::PartialUpdate(format!(
                "feedback recorded on item {} but seller {} rating was not updated: {}",
                item_id, seller_id, e
            )));
        }
        Ok(())
    }

    fn release(&self, buyer_id: BuyerId) {
        let kept = self.carts.release(buyer_id);
        debug!(buyer_id = %buyer_id, kept, "Cart released");
    }

    async fn purchase(&self, buyer_id: BuyerId, item_id: ItemId) -> MarketResult<()> {
        let seller_id = self.inventory.get(item_id)?.seller_id;
        self.history.record(buyer_id, item_id);

        // History is already written; there is nothing to roll back
        let relayed = match self.customer.increment_items_sold(seller_id).await {
            Ok(()) => self.customer.increment_items_purchased(buyer_id).await,
            Err(e) => Err(e),
        };
        if let Err(e) = relayed {
            warn!(
                item_id = %item_id,
                buyer_id = %buyer_id,
                seller_id = %seller_id,
                error = %e,
                "Purchase counters not updated after history was recorded"
            );
            return Err(MarketError::PartialUpdate(format!(
                "purchase of item {} recorded but account counters were not updated: {}",
                item_id, e
            )));
        }
        Ok(())
    }

    /// Run one request against the stores
    pub async fn execute(&self, request: ProductRequest) -> Response {
        match request {
            ProductRequest::RegisterItem {
                seller_id,
                name,
                category,
                keywords,
                condition,
                price,
                quantity,
            } => {
                let item = NewItem { name, category, keywords, condition, price, quantity };
                Response::from_result(self.inventory.register(seller_id, item))
            }
            ProductRequest::ChangeItemPrice { item_id, seller_id, new_price } => {
                Response::from_result(self.inventory.change_price(item_id, seller_id, new_price))
            }
            ProductRequest::UpdateUnitsForSale { item_id, seller_id, delta } => Response::from_result(
                self.inventory.update_units(item_id, seller_id, delta).map(|_| ()),
            ),
            ProductRequest::DisplayItemsForSale { seller_id } => {
                Response::ok(&self.inventory.items_for_seller(seller_id))
            }
            ProductRequest::SearchItemsForSale { category, keywords } => {
                Response::from_result(self.search(category, &keywords))
            }
            ProductRequest::GetItem { item_id } => Response::from_result(self.inventory.get(item_id)),
            ProductRequest::AddItemToCart { buyer_id, item_id, qty } => {
                Response::from_result(self.add_to_cart(buyer_id, item_id, qty))
            }
            ProductRequest::RemoveItemFromCart { buyer_id, item_id, qty } => {
                Response::from_result(self.carts.remove(buyer_id, item_id, qty))
            }
            ProductRequest::SaveCart { buyer_id } => {
                self.carts.save(buyer_id);
                Response::ok(&())
            }
            ProductRequest::ClearCart { buyer_id } => {
                self.carts.clear(buyer_id);
                Response::ok(&())
            }
            ProductRequest::DisplayCart { buyer_id } => Response::ok(&self.carts.display(buyer_id)),
            ProductRequest::ReleaseCart { buyer_id } => {
                self.release(buyer_id);
                Response::ok(&())
            }
            ProductRequest::ProvideFeedback { item_id, thumbs } => {
                Response::from_result(self.relay_feedback(item_id, thumbs).await)
            }
            ProductRequest::RecordPurchase { buyer_id, item_id } => {
                Response::from_result(self.purchase(buyer_id, item_id).await)
            }
            ProductRequest::GetPurchaseHistory { buyer_id } => {
                Response::ok(&self.history.get(buyer_id))
            }
        }
    }
}

#[async_trait]
impl ProductApi for ProductDb {
    async fn register_item(&self, seller_id: SellerId, item: NewItem) -> MarketResult<ItemId> {
        self.inventory.register(seller_id, item)
    }

    async fn change_item_price(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        new_price: f64,
    ) -> MarketResult<()> {
        self.inventory.change_price(item_id, seller_id, new_price)
    }

    async fn update_units_for_sale(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        delta: i64,
    ) -> MarketResult<()> {
        self.inventory.update_units(item_id, seller_id, delta).map(|_| ())
    }

    async fn display_items_for_sale(&self, seller_id: SellerId) -> MarketResult<Vec<Item>> {
        Ok(self.inventory.items_for_seller(seller_id))
    }

    async fn search_items_for_sale(
        &self,
        category: Option<i32>,
        keywords: Vec<String>,
    ) -> MarketResult<Vec<Item>> {
        self.search(category, &keywords)
    }

    async fn get_item(&self, item_id: ItemId) -> MarketResult<Item> {
        self.inventory.get(item_id)
    }

    async fn add_item_to_cart(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        self.add_to_cart(buyer_id, item_id, qty)
    }

    async fn remove_item_from_cart(
        &self,
        buyer_id: BuyerId,
        item_id: ItemId,
        qty: i64,
    ) -> MarketResult<()> {
        self.carts.remove(buyer_id, item_id, qty)
    }

    async fn save_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.carts.save(buyer_id);
        Ok(())
    }

    async fn clear_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.carts.clear(buyer_id);
        Ok(())
    }

    async fn display_cart(&self, buyer_id: BuyerId) -> MarketResult<Vec<CartLine>> {
        Ok(self.carts.display(buyer_id))
    }

    async fn release_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.release(buyer_id);
        Ok(())
    }

    async fn provide_feedback(&self, item_id: ItemId, thumbs: Thumbs) -> MarketResult<()> {
        self.relay_feedback(item_id, thumbs).await
    }

    async fn record_purchase(&self, buyer_id: BuyerId, item_id: ItemId) -> MarketResult<()> {
        self.purchase(buyer_id, item_id).await
    }

    async fn purchase_history(&self, buyer_id: BuyerId) -> MarketResult<Vec<ItemId>> {
        Ok(self.history.get(buyer_id))
    }
}

#[async_trait]
impl Service for ProductDb {
    type Request = ProductRequest;

    fn name(&self) -> &'static str {
        "product-db"
    }

    fn operation(request: &ProductRequest) -> &'static str {
        request.operation()
    }

    async fn handle(&self, request: ProductRequest) -> Response {
        self.execute(request).await
    }
}
