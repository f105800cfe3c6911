// Request types for every service
// One tagged variant per operation; each service dispatches with a single exhaustive match

use super::model::*;
use serde::{Deserialize, Serialize};

/// Requests understood by the Customer Database service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum CustomerRequest {
    CreateAccount {
        kind: PrincipalKind,
        name: String,
        password: String,
    },
    Login {
        kind: PrincipalKind,
        name: String,
        password: String,
    },
    Logout {
        session_id: SessionId,
    },
    ValidateSession {
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<PrincipalKind>,
    },
    GetSellerRating {
        seller_id: SellerId,
    },
    RecordFeedback {
        seller_id: SellerId,
        thumbs: Thumbs,
    },
    IncrementItemsSold {
        seller_id: SellerId,
    },
    IncrementItemsPurchased {
        buyer_id: BuyerId,
    },
}

impl CustomerRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            CustomerRequest::CreateAccount { .. } => "CreateAccount",
            CustomerRequest::Login { .. } => "Login",
            CustomerRequest::Logout { .. } => "Logout",
            CustomerRequest::ValidateSession { .. } => "ValidateSession",
            CustomerRequest::GetSellerRating { .. } => "GetSellerRating",
            CustomerRequest::RecordFeedback { .. } => "RecordFeedback",
            CustomerRequest::IncrementItemsSold { .. } => "IncrementItemsSold",
            CustomerRequest::IncrementItemsPurchased { .. } => "IncrementItemsPurchased",
        }
    }
}

/// Fields of a new listing, as supplied by the seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: i32,
    pub keywords: Vec<String>,
    pub condition: Condition,
    pub price: f64,
    pub quantity: i64,
}

/// Requests understood by the Product Database service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum ProductRequest {
    RegisterItem {
        seller_id: SellerId,
        name: String,
        category: i32,
        #[serde(default)]
        keywords: Vec<String>,
        condition: Condition,
        price: f64,
        quantity: i64,
    },
    ChangeItemPrice {
        item_id: ItemId,
        seller_id: SellerId,
        new_price: f64,
    },
    UpdateUnitsForSale {
        item_id: ItemId,
        seller_id: SellerId,
        delta: i64,
    },
    DisplayItemsForSale {
        seller_id: SellerId,
    },
    SearchItemsForSale {
        #[serde(default)]
        category: Option<i32>,
        #[serde(default)]
        keywords: Vec<String>,
    },
    GetItem {
        item_id: ItemId,
    },
    AddItemToCart {
        buyer_id: BuyerId,
        item_id: ItemId,
        qty: i64,
    },
    RemoveItemFromCart {
        buyer_id: BuyerId,
        item_id: ItemId,
        qty: i64,
    },
    SaveCart {
        buyer_id: BuyerId,
    },
    ClearCart {
        buyer_id: BuyerId,
    },
    DisplayCart {
        buyer_id: BuyerId,
    },
    ReleaseCart {
        buyer_id: BuyerId,
    },
    ProvideFeedback {
        item_id: ItemId,
        thumbs: Thumbs,
    },
    RecordPurchase {
        buyer_id: BuyerId,
        item_id: ItemId,
    },
    GetPurchaseHistory {
        buyer_id: BuyerId,
    },
}

impl ProductRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            ProductRequest::RegisterItem { .. } => "RegisterItem",
            ProductRequest::ChangeItemPrice { .. } => "ChangeItemPrice",
            ProductRequest::UpdateUnitsForSale { .. } => "UpdateUnitsForSale",
            ProductRequest::DisplayItemsForSale { .. } => "DisplayItemsForSale",
            ProductRequest::SearchItemsForSale { .. } => "SearchItemsForSale",
            ProductRequest::GetItem { .. } => "GetItem",
            ProductRequest::AddItemToCart { .. } => "AddItemToCart",
            ProductRequest::RemoveItemFromCart { .. } => "RemoveItemFromCart",
            ProductRequest::SaveCart { .. } => "SaveCart",
            ProductRequest::ClearCart { .. } => "ClearCart",
            ProductRequest::DisplayCart { .. } => "DisplayCart",
            ProductRequest::ReleaseCart { .. } => "ReleaseCart",
            ProductRequest::ProvideFeedback { .. } => "ProvideFeedback",
            ProductRequest::RecordPurchase { .. } => "RecordPurchase",
            ProductRequest::GetPurchaseHistory { .. } => "GetPurchaseHistory",
        }
    }
}

/// Requests accepted by the Seller Server from seller clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum SellerRequest {
    CreateAccount {
        name: String,
        password: String,
    },
    Login {
        name: String,
        password: String,
    },
    Logout {
        session_id: SessionId,
    },
    GetSellerRating {
        session_id: SessionId,
    },
    RegisterItemForSale {
        session_id: SessionId,
        name: String,
        category: i32,
        #[serde(default)]
        keywords: Vec<String>,
        condition: Condition,
        price: f64,
        quantity: i64,
    },
    ChangeItemPrice {
        session_id: SessionId,
        item_id: ItemId,
        new_price: f64,
    },
    UpdateUnitsForSale {
        session_id: SessionId,
        item_id: ItemId,
        delta: i64,
    },
    DisplayItemsForSale {
        session_id: SessionId,
    },
}

impl SellerRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            SellerRequest::CreateAccount { .. } => "CreateAccount",
            SellerRequest::Login { .. } => "Login",
            SellerRequest::Logout { .. } => "Logout",
            SellerRequest::GetSellerRating { .. } => "GetSellerRating",
            SellerRequest::RegisterItemForSale { .. } => "RegisterItemForSale",
            SellerRequest::ChangeItemPrice { .. } => "ChangeItemPrice",
            SellerRequest::UpdateUnitsForSale { .. } => "UpdateUnitsForSale",
            SellerRequest::DisplayItemsForSale { .. } => "DisplayItemsForSale",
        }
    }
}

/// Requests accepted by the Buyer Server from buyer clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum BuyerRequest {
    CreateAccount {
        name: String,
        password: String,
    },
    Login {
        name: String,
        password: String,
    },
    Logout {
        session_id: SessionId,
    },
    SearchItemsForSale {
        session_id: SessionId,
        #[serde(default)]
        category: Option<i32>,
        #[serde(default)]
        keywords: Vec<String>,
    },
    GetItem {
        session_id: SessionId,
        item_id: ItemId,
    },
    AddItemToCart {
        session_id: SessionId,
        item_id: ItemId,
        qty: i64,
    },
    RemoveItemFromCart {
        session_id: SessionId,
        item_id: ItemId,
        qty: i64,
    },
    SaveCart {
        session_id: SessionId,
    },
    ClearCart {
        session_id: SessionId,
    },
    DisplayCart {
        session_id: SessionId,
    },
    ProvideFeedback {
        session_id: SessionId,
        item_id: ItemId,
        thumbs: Thumbs,
    },
    GetSellerRating {
        session_id: SessionId,
        seller_id: SellerId,
    },
    GetBuyerPurchases {
        session_id: SessionId,
    },
}

impl BuyerRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            BuyerRequest::CreateAccount { .. } => "CreateAccount",
            BuyerRequest::Login { .. } => "Login",
            BuyerRequest::Logout { .. } => "Logout",
            BuyerRequest::SearchItemsForSale { .. } => "SearchItemsForSale",
            BuyerRequest::GetItem { .. } => "GetItem",
            BuyerRequest::AddItemToCart { .. } => "AddItemToCart",
            BuyerRequest::RemoveItemFromCart { .. } => "RemoveItemFromCart",
            BuyerRequest::SaveCart { .. } => "SaveCart",
            BuyerRequest::ClearCart { .. } => "ClearCart",
            BuyerRequest::DisplayCart { .. } => "DisplayCart",
            BuyerRequest::ProvideFeedback { .. } => "ProvideFeedback",
            BuyerRequest::GetSellerRating { .. } => "GetSellerRating",
            BuyerRequest::GetBuyerPurchases { .. } => "GetBuyerPurchases",
        }
    }
}
