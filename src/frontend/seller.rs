// Seller Server
// Seller-facing operations, each checked against the Customer Database session table

use super::{reply, Backends};
use crate::error::MarketResult;
use crate::network::Service;
use crate::product::inventory::normalize_keywords;
use crate::protocol::{
    Feedback, Item, ItemId, NewItem, PrincipalKind, Response, SellerRequest, SessionId,
};
use async_trait::async_trait;

const KIND: PrincipalKind = PrincipalKind::Seller;

pub struct SellerServer {
    backends: Backends,
}

impl SellerServer {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn execute(&self, request: SellerRequest) -> Response {
        let operation = request.operation();
        let customer = &self.backends.customer;

        match request {
            SellerRequest::CreateAccount { name, password } => {
                reply(operation, customer.create_account(KIND, name, password).await)
            }
            SellerRequest::Login { name, password } => {
                reply(operation, customer.login(KIND, name, password).await)
            }
            SellerRequest::Logout { session_id } => reply(operation, self.logout(session_id).await),
            SellerRequest::GetSellerRating { session_id } => {
                reply(operation, self.own_rating(session_id).await)
            }
            SellerRequest::RegisterItemForSale {
                session_id,
                name,
                category,
                keywords,
                condition,
                price,
                quantity,
            } => {
                let item = NewItem {
                    name,
                    category,
                    keywords: normalize_keywords(keywords),
                    condition,
                    price,
                    quantity,
                };
                reply(operation, self.register(session_id, item).await)
            }
            SellerRequest::ChangeItemPrice { session_id, item_id, new_price } => {
                reply(operation, self.change_price(session_id, item_id, new_price).await)
            }
            SellerRequest::UpdateUnitsForSale { session_id, item_id, delta } => {
                reply(operation, self.update_units(session_id, item_id, delta).await)
            }
            SellerRequest::DisplayItemsForSale { session_id } => {
                reply(operation, self.display_items(session_id).await)
            }
        }
    }

    async fn logout(&self, session_id: SessionId) -> MarketResult<()> {
        self.backends.authenticate(session_id, KIND).await?;
        self.backends.customer.logout(session_id).await
    }

    async fn own_rating(&self, session_id: SessionId) -> MarketResult<Feedback> {
        let seller_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.customer.seller_rating(seller_id).await
    }

    async fn register(&self, session_id: SessionId, item: NewItem) -> MarketResult<ItemId> {
        let seller_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.register_item(seller_id, item).await
    }

    async fn change_price(&self, session_id: SessionId, item_id: ItemId, new_price: f64) -> MarketResult<()> {
        let seller_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends
            .product
            .change_item_price(item_id, seller_id, new_price)
            .await
    }

    async fn update_units(&self, session_id: SessionId, item_id: ItemId, delta: i64) -> MarketResult<()> {
        let seller_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends
            .product
            .update_units_for_sale(item_id, seller_id, delta)
            .await
    }

    async fn display_items(&self, session_id: SessionId) -> MarketResult<Vec<Item>> {
        let seller_id = self.backends.authenticate(session_id, KIND).await?;
        self.backends.product.display_items_for_sale(seller_id).await
    }
}

#[async_trait]
impl Service for SellerServer {
    type Request = SellerRequest;

    fn name(&self) -> &'static str {
        "seller-server"
    }

    fn operation(request: &SellerRequest) -> &'static str {
        request.operation()
    }

    async fn handle(&self, request: SellerRequest) -> Response {
        self.execute(request).await
    }
}
