// Customer Database service
// Owns accounts and sessions; every frontend request is validated here first

pub mod accounts;
pub mod client;
pub mod sessions;
pub mod sweeper;

pub use accounts::AccountStore;
pub use client::RemoteCustomerDb;
pub use sessions::SessionStore;
pub use sweeper::ExpirySweeper;

use crate::config::SessionConfig;
use crate::error::MarketResult;
use crate::network::Service;
use crate::protocol::{
    BuyerId, CustomerRequest, Feedback, PrincipalId, PrincipalKind, Response, SellerId, SessionId,
    SessionInfo, Thumbs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Operations offered by the Customer Database, whether in-process or across TCP
#[async_trait]
pub trait CustomerApi: Send + Sync {
    async fn create_account(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<PrincipalId>;

    async fn login(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<SessionId>;

    async fn logout(&self, session_id: SessionId) -> MarketResult<()>;

    /// Confirm a session and refresh its sliding expiry
    async fn validate_session(
        &self,
        session_id: SessionId,
        kind: Option<PrincipalKind>,
    ) -> MarketResult<SessionInfo>;

    async fn seller_rating(&self, seller_id: SellerId) -> MarketResult<Feedback>;

    async fn record_feedback(&self, seller_id: SellerId, thumbs: Thumbs) -> MarketResult<()>;

    async fn increment_items_sold(&self, seller_id: SellerId) -> MarketResult<()>;

    async fn increment_items_purchased(&self, buyer_id: BuyerId) -> MarketResult<()>;
}

/// The Customer Database: account store plus session store
pub struct CustomerDb {
    accounts: AccountStore,
    sessions: Arc<SessionStore>,
}

impl CustomerDb {
    pub fn new(config: &SessionConfig) -> Self {
        info!(timeout_secs = config.timeout_secs, "Initializing Customer Database");

        Self {
            accounts: AccountStore::new(),
            sessions: Arc::new(SessionStore::new(config.timeout(), config.tombstone_retention())),
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Build the expiry sweeper for this database's sessions
    pub fn sweeper(&self, config: &SessionConfig) -> ExpirySweeper {
        ExpirySweeper::new(self.sessions.clone(), config.sweep_interval())
    }

    fn login_sync(&self, kind: PrincipalKind, name: &str, password: &str) -> MarketResult<SessionId> {
        let principal_id = self.accounts.authenticate(kind, name, password)?;
        Ok(self.sessions.create(principal_id, kind))
    }

    /// Run one request against the stores
    pub fn execute(&self, request: CustomerRequest) -> Response {
        match request {
            CustomerRequest::CreateAccount { kind, name, password } => {
                Response::from_result(self.accounts.create_account(kind, name, password))
            }
            CustomerRequest::Login { kind, name, password } => {
                Response::from_result(self.login_sync(kind, &name, &password))
            }
            CustomerRequest::Logout { session_id } => {
                Response::from_result(self.sessions.logout(session_id))
            }
            CustomerRequest::ValidateSession { session_id, kind } => {
                Response::from_result(self.sessions.validate(session_id, kind))
            }
            CustomerRequest::GetSellerRating { seller_id } => {
                Response::from_result(self.accounts.seller_rating(seller_id))
            }
            CustomerRequest::RecordFeedback { seller_id, thumbs } => {
                debug!(seller_id = %seller_id, thumbs = ?thumbs, "Recording seller feedback");
                Response::from_result(self.accounts.record_feedback(seller_id, thumbs))
            }
            CustomerRequest::IncrementItemsSold { seller_id } => {
                Response::from_result(self.accounts.increment_items_sold(seller_id))
            }
            CustomerRequest::IncrementItemsPurchased { buyer_id } => {
                Response::from_result(self.accounts.increment_items_purchased(buyer_id))
            }
        }
    }
}

#[async_trait]
impl CustomerApi for CustomerDb {
    async fn create_account(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<PrincipalId> {
        self.accounts.create_account(kind, name, password)
    }

    async fn login(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<SessionId> {
        self.login_sync(kind, &name, &password)
    }

    async fn logout(&self, session_id: SessionId) -> MarketResult<()> {
        self.sessions.logout(session_id)
    }

    async fn validate_session(
        &self,
        session_id: SessionId,
        kind: Option<PrincipalKind>,
    ) -> MarketResult<SessionInfo> {
        self.sessions.validate(session_id, kind)
    }

    async fn seller_rating(&self, seller_id: SellerId) -> MarketResult<Feedback> {
        self.accounts.seller_rating(seller_id)
    }

    async fn record_feedback(&self, seller_id: SellerId, thumbs: Thumbs) -> MarketResult<()> {
        self.accounts.record_feedback(seller_id, thumbs)
    }

    async fn increment_items_sold(&self, seller_id: SellerId) -> MarketResult<()> {
        self.accounts.increment_items_sold(seller_id)
    }

    async fn increment_items_purchased(&self, buyer_id: BuyerId) -> MarketResult<()> {
        self.accounts.increment_items_purchased(buyer_id)
    }
}

#[async_trait]
impl Service for CustomerDb {
    type Request = CustomerRequest;

    fn name(&self) -> &'static str {
        "customer-db"
    }

    fn operation(request: &CustomerRequest) -> &'static str {
        request.operation()
    }

    async fn handle(&self, request: CustomerRequest) -> Response {
        self.execute(request)
    }
}
