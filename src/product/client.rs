// Remote Product Database client
// Speaks the line protocol, one TCP connection per call

use super::ProductApi;
use crate::error::MarketResult;
use crate::network;
use crate::protocol::{
    BuyerId, CartLine, Item, ItemId, NewItem, ProductRequest, SellerId, Thumbs,
};
use async_trait::async_trait;

/// Product Database reached over TCP
#[derive(Debug, Clone)]
pub struct RemoteProductDb {
    addr: String,
}

impl RemoteProductDb {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: ProductRequest) -> MarketResult<T> {
        network::call(&self.addr, &request).await
    }
}

#[async_trait]
impl ProductApi for RemoteProductDb {
    async fn register_item(&self, seller_id: SellerId, item: NewItem) -> MarketResult<ItemId> {
        self.send(ProductRequest::RegisterItem {
            seller_id,
            name: item.name,
            category: item.category,
            keywords: item.keywords,
            condition: item.condition,
            price: item.price,
            quantity: item.quantity,
        })
        .await
    }

    async fn change_item_price(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        new_price: f64,
    ) -> MarketResult<()> {
        self.send(ProductRequest::ChangeItemPrice { item_id, seller_id, new_price }).await
    }

    async fn update_units_for_sale(
        &self,
        item_id: ItemId,
        seller_id: SellerId,
        delta: i64,
    ) -> MarketResult<()> {
        self.send(ProductRequest::UpdateUnitsForSale { item_id, seller_id, delta }).await
    }

    async fn display_items_for_sale(&self, seller_id: SellerId) -> MarketResult<Vec<Item>> {
        self.send(ProductRequest::DisplayItemsForSale { seller_id }).await
    }

    async fn search_items_for_sale(
        &self,
        category: Option<i32>,
        keywords: Vec<String>,
    ) -> MarketResult<Vec<Item>> {
        self.send(ProductRequest::SearchItemsForSale { category, keywords }).await
    }

    async fn get_item(&self, item_id: ItemId) -> MarketResult<Item> {
        self.send(ProductRequest::GetItem { item_id }).await
    }

    async fn add_item_to_cart(&self, buyer_id: BuyerId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        self.send(ProductRequest::AddItemToCart { buyer_id, item_id, qty }).await
    }

    async fn remove_item_from_cart(
        &self,
        buyer_id: BuyerId,
        item_id: ItemId,
        qty: i64,
    ) -> MarketResult<()> {
        self.send(ProductRequest::RemoveItemFromCart { buyer_id, item_id, qty }).await
    }

    async fn save_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.send(ProductRequest::SaveCart { buyer_id }).await
    }

    async fn clear_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.send(ProductRequest::ClearCart { buyer_id }).await
    }

    async fn display_cart(&self, buyer_id: BuyerId) -> MarketResult<Vec<CartLine>> {
        self.send(ProductRequest::DisplayCart { buyer_id }).await
    }

    async fn release_cart(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.send(ProductRequest::ReleaseCart { buyer_id }).await
    }

    async fn provide_feedback(&self, item_id: ItemId, thumbs: Thumbs) -> MarketResult<()> {
        self.send(ProductRequest::ProvideFeedback { item_id, thumbs }).await
    }

    async fn record_purchase(&self, buyer_id: BuyerId, item_id: ItemId) -> MarketResult<()> {
        self.send(ProductRequest::RecordPurchase { buyer_id, item_id }).await
    }

    async fn purchase_history(&self, buyer_id: BuyerId) -> MarketResult<Vec<ItemId>> {
        self.send(ProductRequest::GetPurchaseHistory { buyer_id }).await
    }
}
