// Remote Customer Database client
// Speaks the line protocol, one TCP connection per call

use super::CustomerApi;
use crate::error::MarketResult;
use crate::network;
use crate::protocol::{
    BuyerId, CustomerRequest, Feedback, PrincipalId, PrincipalKind, SellerId, SessionId,
    SessionInfo, Thumbs,
};
use async_trait::async_trait;

/// Customer Database reached over TCP
#[derive(Debug, Clone)]
pub struct RemoteCustomerDb {
    addr: String,
}

impl RemoteCustomerDb {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl CustomerApi for RemoteCustomerDb {
    async fn create_account(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<PrincipalId> {
        network::call(&self.addr, &CustomerRequest::CreateAccount { kind, name, password }).await
    }

    async fn login(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<SessionId> {
        network::call(&self.addr, &CustomerRequest::Login { kind, name, password }).await
    }

    async fn logout(&self, session_id: SessionId) -> MarketResult<()> {
        network::call(&self.addr, &CustomerRequest::Logout { session_id }).await
    }

    async fn validate_session(
        &self,
        session_id: SessionId,
        kind: Option<PrincipalKind>,
    ) -> MarketResult<SessionInfo> {
        network::call(&self.addr, &CustomerRequest::ValidateSession { session_id, kind }).await
    }

    async fn seller_rating(&self, seller_id: SellerId) -> MarketResult<Feedback> {
        network::call(&self.addr, &CustomerRequest::GetSellerRating { seller_id }).await
    }

    async fn record_feedback(&self, seller_id: SellerId, thumbs: Thumbs) -> MarketResult<()> {
        network::call(&self.addr, &CustomerRequest::RecordFeedback { seller_id, thumbs }).await
    }

    async fn increment_items_sold(&self, seller_id: SellerId) -> MarketResult<()> {
        network::call(&self.addr, &CustomerRequest::IncrementItemsSold { seller_id }).await
    }

    async fn increment_items_purchased(&self, buyer_id: BuyerId) -> MarketResult<()> {
        network::call(&self.addr, &CustomerRequest::IncrementItemsPurchased { buyer_id }).await
    }
}
