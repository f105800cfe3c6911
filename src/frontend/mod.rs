// Frontend services
// Stateless translators from client requests to backend calls

pub mod buyer;
pub mod seller;

pub use buyer::BuyerServer;
pub use seller::SellerServer;

use crate::config::UpstreamConfig;
use crate::customer::{CustomerApi, RemoteCustomerDb};
use crate::error::MarketResult;
use crate::product::{ProductApi, RemoteProductDb};
use crate::protocol::{PrincipalId, PrincipalKind, Response, SessionId};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Handles to both backends. The only thing a frontend holds between requests.
#[derive(Clone)]
pub struct Backends {
    pub customer: Arc<dyn CustomerApi>,
    pub product: Arc<dyn ProductApi>,
}

impl Backends {
    pub fn new(customer: Arc<dyn CustomerApi>, product: Arc<dyn ProductApi>) -> Self {
        Self { customer, product }
    }

    /// Backends reached over TCP at the configured addresses
    pub fn remote(upstream: &UpstreamConfig) -> Self {
        Self::new(
            Arc::new(RemoteCustomerDb::new(upstream.customer_db_addr.clone())),
            Arc::new(RemoteProductDb::new(upstream.product_db_addr.clone())),
        )
    }

    /// Validate the session for a principal of `kind` and return who it belongs to
    pub async fn authenticate(&self, session_id: SessionId, kind: PrincipalKind) -> MarketResult<PrincipalId> {
        let info = self.customer.validate_session(session_id, Some(kind)).await?;
        Ok(info.principal_id)
    }
}

/// Compose the client response, labelling failures with the operation name
pub(crate) fn reply<T: Serialize>(operation: &str, result: MarketResult<T>) -> Response {
    match result {
        Ok(payload) => Response::ok(&payload),
        Err(err) => {
            debug!(operation = operation, kind = %err.kind(), error = %err, "Request failed");
            Response::labelled_error(operation, &err)
        }
    }
}
