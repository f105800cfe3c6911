// Integration tests for the marketplace services
// All four services on loopback TCP, driven through the line protocol

use marketplace::config::SessionConfig;
use marketplace::customer::{CustomerDb, RemoteCustomerDb};
use marketplace::frontend::{Backends, BuyerServer, SellerServer};
use marketplace::network::{self, NetworkConfig, Service};
use marketplace::product::ProductDb;
use marketplace::protocol::{
    BuyerRequest, CartLine, Condition, CustomerRequest, Feedback, Item, ItemId, PrincipalId,
    Response, SellerRequest, SessionId, SessionInfo, Thumbs,
};
use marketplace::signals::ShutdownCoordinator;
use marketplace::{ErrorKind, MarketResult};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

struct Cluster {
    customer_db: String,
    seller: String,
    buyer: String,
    _shutdown: ShutdownCoordinator,
}

async fn start<S: Service>(service: Arc<S>, shutdown: &ShutdownCoordinator) -> String {
    let listener = network::bind("127.0.0.1:0".parse().unwrap(), &NetworkConfig::default())
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(network::serve(
        listener,
        service,
        NetworkConfig::default(),
        shutdown.subscribe(),
    ));
    addr
}

/// Start every service, each backend talking to the other over TCP
async fn cluster_with(sessions: SessionConfig) -> Cluster {
    let shutdown = ShutdownCoordinator::new();

    let customer = Arc::new(CustomerDb::new(&sessions));
    customer.sweeper(&sessions).start();
    let customer_db = start(customer, &shutdown).await;

    let product = Arc::new(ProductDb::new(Arc::new(RemoteCustomerDb::new(customer_db.clone()))));
    let product_db = start(product, &shutdown).await;

    let backends = Backends::new(
        Arc::new(RemoteCustomerDb::new(customer_db.clone())),
        Arc::new(marketplace::product::RemoteProductDb::new(product_db)),
    );
    let seller = start(Arc::new(SellerServer::new(backends.clone())), &shutdown).await;
    let buyer = start(Arc::new(BuyerServer::new(backends)), &shutdown).await;

    Cluster { customer_db, seller, buyer, _shutdown: shutdown }
}

async fn cluster() -> Cluster {
    cluster_with(SessionConfig::default()).await
}

async fn seller<T: DeserializeOwned>(cluster: &Cluster, request: SellerRequest) -> MarketResult<T> {
    network::call(&cluster.seller, &request).await
}

async fn buyer<T: DeserializeOwned>(cluster: &Cluster, request: BuyerRequest) -> MarketResult<T> {
    network::call(&cluster.buyer, &request).await
}

async fn seller_login(cluster: &Cluster, name: &str) -> SessionId {
    let _: PrincipalId = seller(
        cluster,
        SellerRequest::CreateAccount { name: name.into(), password: "pw".into() },
    )
    .await
    .expect("Failed to create seller");
    seller(cluster, SellerRequest::Login { name: name.into(), password: "pw".into() })
        .await
        .expect("Failed to log in seller")
}

async fn buyer_create(cluster: &Cluster, name: &str) {
    let _: PrincipalId = buyer(
        cluster,
        BuyerRequest::CreateAccount { name: name.into(), password: "pw".into() },
    )
    .await
    .expect("Failed to create buyer");
}

async fn buyer_login(cluster: &Cluster, name: &str) -> SessionId {
    buyer(cluster, BuyerRequest::Login { name: name.into(), password: "pw".into() })
        .await
        .expect("Failed to log in buyer")
}

async fn list_item(cluster: &Cluster, session_id: SessionId, name: &str, keywords: &[&str], quantity: i64) -> ItemId {
    seller(
        cluster,
        SellerRequest::RegisterItemForSale {
            session_id,
            name: name.into(),
            category: 1,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            condition: Condition::New,
            price: 10.0,
            quantity,
        },
    )
    .await
    .expect("Failed to register item")
}

async fn display_cart(cluster: &Cluster, session_id: SessionId) -> Vec<CartLine> {
    buyer(cluster, BuyerRequest::DisplayCart { session_id })
        .await
        .expect("Failed to display cart")
}

/// Write raw lines on one connection and collect one response per line
async fn exchange_raw(addr: &str, lines: &[&str]) -> Vec<Response> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read).lines();

    let mut responses = Vec::new();
    for line in lines {
        write.write_all(line.as_bytes()).await.unwrap();
        write.write_all(b"\n").await.unwrap();
        let reply = reader.next_line().await.unwrap().expect("Connection closed early");
        responses.push(serde_json::from_str(&reply).unwrap());
    }
    responses
}

#[tokio::test]
async fn test_seller_scenario() {
    let cluster = cluster().await;
    let session_id = seller_login(&cluster, "Alice").await;

    let item_id: ItemId = seller(
        &cluster,
        SellerRequest::RegisterItemForSale {
            session_id,
            name: "Laptop".into(),
            category: 1,
            keywords: vec!["electronics".into(), "computer".into()],
            condition: Condition::New,
            price: 999.99,
            quantity: 10,
        },
    )
    .await
    .unwrap();
    assert_eq!(item_id.category, 1);

    let () = seller(
        &cluster,
        SellerRequest::ChangeItemPrice { session_id, item_id, new_price: 899.99 },
    )
    .await
    .unwrap();
    let () = seller(
        &cluster,
        SellerRequest::UpdateUnitsForSale { session_id, item_id, delta: -3 },
    )
    .await
    .unwrap();

    buyer_create(&cluster, "bob").await;
    let buyer_session = buyer_login(&cluster, "bob").await;
    let item: Item = buyer(&cluster, BuyerRequest::GetItem { session_id: buyer_session, item_id })
        .await
        .unwrap();
    assert_eq!(item.price, 899.99);
    assert_eq!(item.quantity, 7);

    let () = seller(&cluster, SellerRequest::Logout { session_id }).await.unwrap();
    let err = network::call::<_, SessionInfo>(
        &cluster.customer_db,
        &CustomerRequest::ValidateSession { session_id, kind: None },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionNotFound);
}

#[tokio::test]
async fn test_search_ranking() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let partial = list_item(&cluster, seller_session, "Laptop", &["computer"], 3).await;
    let exact = list_item(&cluster, seller_session, "Manual", &["comp"], 3).await;
    let lamp = list_item(&cluster, seller_session, "Lamp", &["light"], 3).await;
    list_item(&cluster, seller_session, "Old PC", &["computer"], 0).await;

    buyer_create(&cluster, "bob").await;
    let session_id = buyer_login(&cluster, "bob").await;

    let found: Vec<Item> = buyer(
        &cluster,
        BuyerRequest::SearchItemsForSale { session_id, category: Some(1), keywords: vec!["comp".into()] },
    )
    .await
    .unwrap();
    let ids: Vec<ItemId> = found.iter().map(|item| item.item_id).collect();
    assert_eq!(ids, vec![exact, partial, lamp]);

    let found: Vec<Item> = buyer(
        &cluster,
        BuyerRequest::SearchItemsForSale { session_id, category: None, keywords: vec!["comp".into()] },
    )
    .await
    .unwrap();
    let ids: Vec<ItemId> = found.iter().map(|item| item.item_id).collect();
    assert_eq!(ids, vec![exact, partial]);
}

#[tokio::test]
async fn test_category_search_without_keyword_match() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let desk = list_item(&cluster, seller_session, "Desk", &["desk"], 2).await;

    buyer_create(&cluster, "bob").await;
    let session_id = buyer_login(&cluster, "bob").await;

    let found: Vec<Item> = buyer(
        &cluster,
        BuyerRequest::SearchItemsForSale { session_id, category: Some(1), keywords: vec!["lamp".into()] },
    )
    .await
    .unwrap();
    let ids: Vec<ItemId> = found.iter().map(|item| item.item_id).collect();
    assert_eq!(ids, vec![desk]);

    let found: Vec<Item> = buyer(
        &cluster,
        BuyerRequest::SearchItemsForSale { session_id, category: Some(2), keywords: vec!["lamp".into()] },
    )
    .await
    .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_cart_lifecycle() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let item_id = list_item(&cluster, seller_session, "Desk", &["desk"], 10).await;

    buyer_create(&cluster, "bob").await;
    let session_id = buyer_login(&cluster, "bob").await;

    for qty in [2, 3] {
        let () = buyer(&cluster, BuyerRequest::AddItemToCart { session_id, item_id, qty })
            .await
            .unwrap();
    }
    assert_eq!(display_cart(&cluster, session_id).await, vec![CartLine { item_id, quantity: 5 }]);

    let () = buyer(&cluster, BuyerRequest::RemoveItemFromCart { session_id, item_id, qty: 2 })
        .await
        .unwrap();
    assert_eq!(display_cart(&cluster, session_id).await[0].quantity, 3);

    let err = buyer::<()>(&cluster, BuyerRequest::AddItemToCart { session_id, item_id, qty: 8 })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientQuantity);
    assert!(err.to_string().starts_with("AddItemToCart: "));

    let () = buyer(&cluster, BuyerRequest::SaveCart { session_id }).await.unwrap();
    let () = buyer(&cluster, BuyerRequest::ClearCart { session_id }).await.unwrap();
    assert!(display_cart(&cluster, session_id).await.is_empty());
}

#[tokio::test]
async fn test_saved_cart_survives_logout() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let desk = list_item(&cluster, seller_session, "Desk", &["desk"], 10).await;
    let lamp = list_item(&cluster, seller_session, "Lamp", &["lamp"], 10).await;

    buyer_create(&cluster, "saver").await;
    buyer_create(&cluster, "browser").await;

    let saver = buyer_login(&cluster, "saver").await;
    let () = buyer(&cluster, BuyerRequest::AddItemToCart { session_id: saver, item_id: desk, qty: 1 })
        .await
        .unwrap();
    let () = buyer(&cluster, BuyerRequest::SaveCart { session_id: saver }).await.unwrap();
    // Still part of the saved cart
    let () = buyer(&cluster, BuyerRequest::AddItemToCart { session_id: saver, item_id: lamp, qty: 1 })
        .await
        .unwrap();
    let () = buyer(&cluster, BuyerRequest::Logout { session_id: saver }).await.unwrap();

    let browser = buyer_login(&cluster, "browser").await;
    let () = buyer(&cluster, BuyerRequest::AddItemToCart { session_id: browser, item_id: desk, qty: 1 })
        .await
        .unwrap();
    let () = buyer(&cluster, BuyerRequest::Logout { session_id: browser }).await.unwrap();

    let saver = buyer_login(&cluster, "saver").await;
    assert_eq!(
        display_cart(&cluster, saver).await,
        vec![CartLine { item_id: desk, quantity: 1 }, CartLine { item_id: lamp, quantity: 1 }]
    );

    let browser = buyer_login(&cluster, "browser").await;
    assert!(display_cart(&cluster, browser).await.is_empty());
}

#[tokio::test]
async fn test_save_applies_to_one_login() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let desk = list_item(&cluster, seller_session, "Desk", &["desk"], 10).await;

    buyer_create(&cluster, "bob").await;
    let session_id = buyer_login(&cluster, "bob").await;
    let () = buyer(&cluster, BuyerRequest::AddItemToCart { session_id, item_id: desk, qty: 2 })
        .await
        .unwrap();
    let () = buyer(&cluster, BuyerRequest::SaveCart { session_id }).await.unwrap();
    let () = buyer(&cluster, BuyerRequest::Logout { session_id }).await.unwrap();

    let session_id = buyer_login(&cluster, "bob").await;
    assert_eq!(display_cart(&cluster, session_id).await, vec![CartLine { item_id: desk, quantity: 2 }]);
    let () = buyer(&cluster, BuyerRequest::Logout { session_id }).await.unwrap();

    let session_id = buyer_login(&cluster, "bob").await;
    assert!(display_cart(&cluster, session_id).await.is_empty());
}

#[tokio::test]
async fn test_feedback_updates_rating() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;
    let item_id = list_item(&cluster, seller_session, "Desk", &["desk"], 1).await;

    buyer_create(&cluster, "bob").await;
    let session_id = buyer_login(&cluster, "bob").await;

    for thumbs in [Thumbs::Up, Thumbs::Up, Thumbs::Down] {
        let () = buyer(&cluster, BuyerRequest::ProvideFeedback { session_id, item_id, thumbs })
            .await
            .unwrap();
    }

    let rating: Feedback = seller(&cluster, SellerRequest::GetSellerRating { session_id: seller_session })
        .await
        .unwrap();
    assert_eq!(rating, Feedback { up: 2, down: 1 });

    let item: Item = buyer(&cluster, BuyerRequest::GetItem { session_id, item_id }).await.unwrap();
    assert_eq!(item.feedback, Feedback { up: 2, down: 1 });
}

#[tokio::test]
async fn test_concurrent_account_creation() {
    let cluster = Arc::new(cluster().await);

    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let cluster = cluster.clone();
            tokio::spawn(async move {
                buyer::<PrincipalId>(
                    &cluster,
                    BuyerRequest::CreateAccount { name: format!("buyer-{i}"), password: "pw".into() },
                )
                .await
                .expect("CreateAccount failed under load")
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap());
    }
    assert_eq!(ids.len(), 100);
}

#[tokio::test]
async fn test_malformed_line_keeps_connection() {
    let cluster = cluster().await;

    let responses = exchange_raw(
        &cluster.seller,
        &[
            "{this is not json",
            r#"{"operation":"MakePurchase"}"#,
            r#"{"operation":"CreateAccount","name":"alice","password":"pw"}"#,
        ],
    )
    .await;

    assert_eq!(responses[0].error_kind, Some(ErrorKind::ProtocolError));
    assert_eq!(responses[1].error_kind, Some(ErrorKind::ProtocolError));
    assert!(responses[2].is_ok());
}

#[tokio::test]
async fn test_wrong_principal_kind() {
    let cluster = cluster().await;
    let seller_session = seller_login(&cluster, "alice").await;

    let err = buyer::<Vec<CartLine>>(&cluster, BuyerRequest::DisplayCart { session_id: seller_session })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongPrincipalKind);
}

#[tokio::test]
async fn test_bad_credentials() {
    let cluster = cluster().await;
    buyer_create(&cluster, "bob").await;

    let err = buyer::<SessionId>(&cluster, BuyerRequest::Login { name: "bob".into(), password: "nope".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthError);
}

#[tokio::test]
async fn test_idle_session_expires() {
    let cluster = cluster_with(SessionConfig {
        timeout_secs: 1,
        sweep_interval_secs: 1,
        ..SessionConfig::default()
    })
    .await;
    let session_id = seller_login(&cluster, "alice").await;

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let err = seller::<Vec<Item>>(&cluster, SellerRequest::DisplayItemsForSale { session_id })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionExpired);
}
