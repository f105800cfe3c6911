// Account store for the Customer Database
// Seller and buyer identities, credentials and counters

use crate::error::{MarketError, MarketResult};
use crate::protocol::{Feedback, PrincipalId, PrincipalKind, Thumbs};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

const MAX_NAME_LEN: usize = 32;

/// Kind-specific counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Seller { feedback: Feedback, items_sold: u64 },
    Buyer { items_purchased: u64 },
}

impl Profile {
    fn new(kind: PrincipalKind) -> Self {
        match kind {
            PrincipalKind::Seller => Profile::Seller {
                feedback: Feedback::default(),
                items_sold: 0,
            },
            PrincipalKind::Buyer => Profile::Buyer { items_purchased: 0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: PrincipalId,
    pub name: String,
    /// Compared as an opaque string
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub profile: Profile,
}

/// All accounts of one kind
struct AccountTable {
    accounts: DashMap<PrincipalId, Account>,

    /// Names are not unique, so each maps to every account using it
    names: DashMap<String, Vec<PrincipalId>>,

    next_id: AtomicU64,
}

impl AccountTable {
    fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            names: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

/// Seller and buyer accounts, each kind with its own id space
pub struct AccountStore {
    sellers: AccountTable,
    buyers: AccountTable,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            sellers: AccountTable::new(),
            buyers: AccountTable::new(),
        }
    }

    fn table(&self, kind: PrincipalKind) -> &AccountTable {
        match kind {
            PrincipalKind::Seller => &self.sellers,
            PrincipalKind::Buyer => &self.buyers,
        }
    }

    /// Create an account and return its fresh id. Duplicate names are allowed.
    pub fn create_account(
        &self,
        kind: PrincipalKind,
        name: String,
        password: String,
    ) -> MarketResult<PrincipalId> {
        if name.trim().is_empty() {
            return Err(MarketError::Validation("name cannot be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(MarketError::Validation(format!(
                "name exceeds {} characters",
                MAX_NAME_LEN
            )));
        }
        if password.is_empty() {
            return Err(MarketError::Validation("password cannot be empty".into()));
        }

        let table = self.table(kind);
        let id = PrincipalId(table.next_id.fetch_add(1, Ordering::Relaxed));

        let account = Account {
            id,
            name: name.clone(),
            password,
            created_at: Utc::now(),
            profile: Profile::new(kind),
        };
        info!(kind = %kind, principal_id = %id, created_at = %account.created_at, "Account created");
        table.accounts.insert(id, account);
        table.names.entry(name).or_default().push(id);

        Ok(id)
    }

    /// Find the account matching `name` and `password`.
    /// With several same-named accounts, the lowest id whose password matches wins.
    pub fn authenticate(
        &self,
        kind: PrincipalKind,
        name: &str,
        password: &str,
    ) -> MarketResult<PrincipalId> {
        let table = self.table(kind);

        let mut candidates = table
            .names
            .get(name)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        candidates.sort_unstable();

        candidates
            .into_iter()
            .find(|id| {
                table
                    .accounts
                    .get(id)
                    .map(|account| account.password == password)
                    .unwrap_or(false)
            })
            .ok_or(MarketError::Auth)
    }

    pub fn get(&self, kind: PrincipalKind, id: PrincipalId) -> Option<Account> {
        self.table(kind).accounts.get(&id).map(|a| a.clone())
    }

    pub fn seller_rating(&self, seller_id: PrincipalId) -> MarketResult<Feedback> {
        match self.sellers.accounts.get(&seller_id).map(|a| a.profile.clone()) {
            Some(Profile::Seller { feedback, .. }) => Ok(feedback),
            _ => Err(seller_not_found(seller_id)),
        }
    }

    pub fn record_feedback(&self, seller_id: PrincipalId, thumbs: Thumbs) -> MarketResult<()> {
        let mut account = self
            .sellers
            .accounts
            .get_mut(&seller_id)
            .ok_or_else(|| seller_not_found(seller_id))?;

        match &mut account.profile {
            Profile::Seller { feedback, .. } => {
                feedback.record(thumbs);
                Ok(())
            }
            Profile::Buyer { .. } => Err(seller_not_found(seller_id)),
        }
    }

    pub fn increment_items_sold(&self, seller_id: PrincipalId) -> MarketResult<()> {
        let mut account = self
            .sellers
            .accounts
            .get_mut(&seller_id)
            .ok_or_else(|| seller_not_found(seller_id))?;

        match &mut account.profile {
            Profile::Seller { items_sold, .. } => {
                *items_sold += 1;
                Ok(())
            }
            Profile::Buyer { .. } => Err(seller_not_found(seller_id)),
        }
    }

    pub fn increment_items_purchased(&self, buyer_id: PrincipalId) -> MarketResult<()> {
        let mut account = self
            .buyers
            .accounts
            .get_mut(&buyer_id)
            .ok_or_else(|| MarketError::NotFound(format!("buyer {}", buyer_id)))?;

        match &mut account.profile {
            Profile::Buyer { items_purchased } => {
                *items_purchased += 1;
                Ok(())
            }
            Profile::Seller { .. } => Err(MarketError::NotFound(format!("buyer {}", buyer_id))),
        }
    }

    pub fn count(&self, kind: PrincipalKind) -> usize {
        self.table(kind).accounts.len()
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seller_not_found(seller_id: PrincipalId) -> MarketError {
    MarketError::NotFound(format!("seller {}", seller_id))
}
