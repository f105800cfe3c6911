// Buyer Server
// Buyer-facing operations; carts live in the Product Database, keyed by buyer

use super::{reply, Backends};
use crate::error::MarketResult;
use crate::network::Service;
use crate::product::inventory::normalize_keywords;
use crate::protocol::{
    BuyerRequest, CartLine, Feedback, Item, ItemId, PrincipalKind, Response, SellerId, SessionId,
    Thumbs,
};
use async_trait::async_trait;
use tracing::debug;

const KIND: PrincipalKind = PrincipalKind::Buyer;

pub struct BuyerServer {
    backends: Backends,
}

impl BuyerServer {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn execute(&self, request: BuyerRequest) -> Response {
        let operation = request.operation();
        let customer = &self.backends.customer;

        match request {
            BuyerRequest::CreateAccount { name, password } => {
                reply(operation, customer.create_account(KIND, name, password).await)
            }
            BuyerRequest::Login { name, password } => {
                reply(operation, customer.login(KIND, name, password).await)
            }
            BuyerRequest::Logout { session_id } => reply(operation, self.logout(session_id).await),
            BuyerRequest::SearchItemsForSale { session_id, category, keywords } => reply(
                operation,
                self.search(session_id, category, normalize_keywords(keywords)).await,
            ),
            BuyerRequest::GetItem { session_id, item_id } => {
                reply(operation, self.get_item(session_id, item_id).await)
            }
            BuyerRequest::AddItemToCart { session_id, item_id, qty } => {
                reply(operation, self.add_to_cart(session_id, item_id, qty).await)
            }
            BuyerRequest::RemoveItemFromCart { session_id, item_id, qty } => {
                reply(operation, self.remove_from_cart(session_id, item_id, qty).await)
            }
            BuyerRequest::SaveCart { session_id } => reply(operation, self.save_cart(session_id).await),
            BuyerRequest::ClearCart { session_id } => {
                reply(operation, self.clear_cart(session_id).await)
            }
            BuyerRequest::DisplayCart { session_id } => {
                reply(operation, self.display_cart(session_id).await)
            }
            BuyerRequest::ProvideFeedback { session_id, item_id, thumbs } => {
                reply(operation, self.provide_feedback(session_id, item_id, thumbs).await)
            }
            BuyerRequest::GetSellerRating { session_id, seller_id } => {
                reply(operation, self.seller_rating(session_id, seller_id).await)
            }
            BuyerRequest::GetBuyerPurchases { session_id } => {
                reply(operation, self.purchases(session_id).await)
            }
        }
    }

    /// An unsaved cart is emptied before the session goes away
    async fn logout(&self, session_id: SessionId) -> MarketResult<()> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.release_cart(buyer_id).await?;
        self.backends.customer.logout(session_id).await?;
        debug!(buyer_id = %buyer_id, "Buyer logged out");
        Ok(())
    }

    async fn search(
        &self,
        session_id: SessionId,
        category: Option<i32>,
        keywords: Vec<String>,
    ) -> MarketResult<Vec<Item>> {
        self.backends.authenticate(session_id, KIND).await?;
        self.backends
            .product
            .search_items_for_sale(category, keywords)
            .await
    }

    async fn get_item(&self, session_id: SessionId, item_id: ItemId) -> MarketResult<Item> {
        self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.get_item(item_id).await
    }

    async fn add_to_cart(&self, session_id: SessionId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.add_item_to_cart(buyer_id, item_id, qty).await
    }

    async fn remove_from_cart(&self, session_id: SessionId, item_id: ItemId, qty: i64) -> MarketResult<()> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends
            .product
            .remove_item_from_cart(buyer_id, item_id, qty)
            .await
    }

    async fn save_cart(&self, session_id: SessionId) -> MarketResult<()> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.save_cart(buyer_id).await
    }

    async fn clear_cart(&self, session_id: SessionId) -> MarketResult<()> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.clear_cart(buyer_id).await
    }

    async fn display_cart(&self, session_id: SessionId) -> MarketResult<Vec<CartLine>> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.display_cart(buyer_id).await
    }

    async fn provide_feedback(&self, session_id: SessionId, item_id: ItemId, thumbs: Thumbs) -> MarketResult<()> {
        self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.provide_feedback(item_id, thumbs).await
    }

    async fn seller_rating(&self, session_id: SessionId, seller_id: SellerId) -> MarketResult<Feedback> {
        self.backends.authenticate(session_id, KIND).await?;
        self.backends.customer.seller_rating(seller_id).await
    }

    async fn purchases(&self, session_id: SessionId) -> MarketResult<Vec<ItemId>> {
        let buyer_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.purchase_history(buyer_id).await
    }
}

#[async_trait]
impl Service for BuyerServer {
    type Request = BuyerRequest;

    fn name(&self) -> &'static str {
        "buyer-server"
    }

    fn operation(request: &BuyerRequest) -> &'static str {
        request.operation()
    }

    async fn handle(&self, request: BuyerRequest) -> Response {
        self.execute(request).await
    }
}
