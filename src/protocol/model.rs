// Data model shared by the backends and frontends
// Identifiers, item records and the small value types carried on the wire

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Seller or buyer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    Seller,
    Buyer,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::Seller => write!(f, "seller"),
            PrincipalKind::Buyer => write!(f, "buyer"),
        }
    }
}

/// Server-assigned account id. Seller and buyer ids come from separate counters,
/// so an id is only meaningful together with its [`PrincipalKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub u64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type SellerId = PrincipalId;
pub type BuyerId = PrincipalId;

/// Opaque session token (UUIDv4, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item identifier: unique per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    pub category: i32,
    pub seq: u64,
}

impl ItemId {
    pub fn new(category: i32, seq: u64) -> Self {
        Self { category, seq }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    New,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thumbs {
    Up,
    Down,
}

/// Thumbs-up / thumbs-down counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub up: u64,
    pub down: u64,
}

impl Feedback {
    pub fn record(&mut self, thumbs: Thumbs) {
        match thumbs {
            Thumbs::Up => self.up += 1,
            Thumbs::Down => self.down += 1,
        }
    }
}

/// An item listed for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    pub category: i32,
    pub keywords: Vec<String>,
    pub condition: Condition,
    pub price: f64,
    pub quantity: u32,
    pub feedback: Feedback,
    pub seller_id: SellerId,
}

/// Result of a successful session validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub principal_id: PrincipalId,
    pub kind: PrincipalKind,
}

/// One cart line as displayed to the buyer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: u32,
}
