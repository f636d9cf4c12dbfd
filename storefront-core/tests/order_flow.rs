//! Order engine integration tests: atomic checkout, price snapshots,
//! lifecycle transitions and stock restoration.

mod common;

use common::{dec, seed_category, seed_product, state, stock_of};
use storefront_core::db::models::ProductUpdate;
use storefront_core::{AppError, OrderStatus};

async fn cart_with(
    state: &storefront_core::AppState,
    user_id: &str,
    lines: &[(&str, i64)],
) -> String {
    let carts = state.carts();
    let cart = carts.get_or_create_cart(Some(user_id), None).await.unwrap();
    let cart_id = cart.id.unwrap().to_string();
    for (product_id, quantity) in lines {
        carts.add_item(&cart_id, product_id, *quantity).await.unwrap();
    }
    cart_id
}

#[tokio::test]
async fn checkout_snapshots_prices_decrements_stock_and_clears_cart() {
    let state = state().await;
    let category = seed_category(&state, "Vegetables").await;
    let product = seed_product(&state, &category, "Tomatoes", "2.50", 10).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 3)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();

    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.user_id, "user:alice");
    assert_eq!(detail.order.total_amount, dec("7.50"));
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 3);
    assert_eq!(detail.items[0].price, dec("2.50"));

    assert_eq!(stock_of(&state, &product).await, 7);

    let totals = state.carts().totals(&cart_id).await.unwrap();
    assert!(totals.items.is_empty());
}

#[tokio::test]
async fn checkout_of_empty_cart_is_rejected() {
    let state = state().await;
    let cart_id = cart_with(&state, "user:alice", &[]).await;

    let err = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(
        state
            .orders()
            .list_for_user("user:alice", 10, 0)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn checkout_of_unknown_cart_is_not_found() {
    let state = state().await;
    let err = state
        .orders()
        .create_order_from_cart("user:alice", "cart:doesnotexist")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn insufficient_stock_aborts_the_whole_checkout() {
    let state = state().await;
    let category = seed_category(&state, "Pantry").await;
    let p1 = seed_product(&state, &category, "Flour", "1.00", 5).await;
    let p2 = seed_product(&state, &category, "Sugar", "2.00", 3).await;
    // Second line exceeds stock; the first line's decrement must roll back
    let cart_id = cart_with(&state, "user:alice", &[(&p1, 2), (&p2, 10)]).await;

    let err = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientStock {
            product_id,
            requested,
        } => {
            assert_eq!(requested, 10);
            assert!(product_id.starts_with("product:"));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // No partial mutation is observable
    assert_eq!(stock_of(&state, &p1).await, 5);
    assert_eq!(stock_of(&state, &p2).await, 3);
    assert!(
        state
            .orders()
            .list_for_user("user:alice", 10, 0)
            .await
            .unwrap()
            .is_empty()
    );
    let totals = state.carts().totals(&cart_id).await.unwrap();
    assert_eq!(totals.items.len(), 2);
}

#[tokio::test]
async fn concurrent_checkouts_never_oversell() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Melons", "6.00", 2).await;

    let c1 = cart_with(&state, "user:alice", &[(&product, 2)]).await;
    let c2 = cart_with(&state, "user:bob", &[(&product, 2)]).await;

    let orders_a = state.orders();
    let orders_b = state.orders();
    let (r1, r2) = tokio::join!(
        orders_a.create_order_from_cart("user:alice", &c1),
        orders_b.create_order_from_cart("user:bob", &c2),
    );

    let successes = usize::from(r1.is_ok()) + usize::from(r2.is_ok());
    assert_eq!(successes, 1, "exactly one checkout may win");

    let stock = stock_of(&state, &product).await;
    assert_eq!(stock, 0);
}

#[tokio::test]
async fn order_total_is_a_price_snapshot() {
    let state = state().await;
    let category = seed_category(&state, "Pantry").await;
    let product = seed_product(&state, &category, "Saffron", "4.00", 10).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 2)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();

    // Later price change must not leak into the placed order
    state
        .catalog()
        .update_product(
            &product,
            ProductUpdate {
                price: Some(dec("9.99")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = state.orders().get_order(&order_id, None).await.unwrap();
    assert_eq!(reloaded.order.total_amount, dec("8.00"));
    assert_eq!(reloaded.items[0].price, dec("4.00"));
}

#[tokio::test]
async fn cancellation_is_the_exact_inverse_of_creation() {
    let state = state().await;
    let category = seed_category(&state, "Pantry").await;
    let p1 = seed_product(&state, &category, "Rice", "1.00", 10).await;
    let p2 = seed_product(&state, &category, "Lentils", "2.00", 5).await;
    let cart_id = cart_with(&state, "user:alice", &[(&p1, 2), (&p2, 1)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();
    assert_eq!(stock_of(&state, &p1).await, 8);
    assert_eq!(stock_of(&state, &p2).await, 4);

    let orders = state.orders();
    orders.set_status(&order_id, OrderStatus::Processing).await.unwrap();

    let cancelled = orders.cancel(&order_id).await.unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, &p1).await, 10);
    assert_eq!(stock_of(&state, &p2).await, 5);

    // A second cancel is rejected and must not double-restore
    let err = orders.cancel(&order_id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    assert_eq!(stock_of(&state, &p1).await, 10);
    assert_eq!(stock_of(&state, &p2).await, 5);
}

#[tokio::test]
async fn completed_orders_cannot_be_cancelled() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Quinces", "3.00", 10).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 1)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();

    let orders = state.orders();
    orders.set_status(&order_id, OrderStatus::Completed).await.unwrap();

    let err = orders.cancel(&order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let reloaded = orders.get_order(&order_id, None).await.unwrap();
    assert_eq!(reloaded.order.status, OrderStatus::Completed);
    assert_eq!(stock_of(&state, &product).await, 9);
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Apricots", "2.00", 10).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 1)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();

    let orders = state.orders();

    // Same-status transition is not in the table
    let err = orders
        .set_status(&order_id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    orders.set_status(&order_id, OrderStatus::Completed).await.unwrap();

    // Terminal state: no way back
    let err = orders
        .set_status(&order_id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Processing,
        }
    ));
}

#[tokio::test]
async fn setting_status_to_cancelled_restores_stock() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Peaches", "2.00", 6).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 4)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();
    assert_eq!(stock_of(&state, &product).await, 2);

    // The admin status route must not skip the stock restoration
    let cancelled = state
        .orders()
        .set_status(&order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, &product).await, 6);
}

#[tokio::test]
async fn orders_are_scoped_to_their_owner() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Kiwis", "1.00", 10).await;
    let cart_id = cart_with(&state, "user:alice", &[(&product, 1)]).await;

    let detail = state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();
    let order_id = detail.order.id.unwrap().to_string();

    let orders = state.orders();
    assert!(orders.get_order(&order_id, Some("user:alice")).await.is_ok());

    let err = orders
        .get_order(&order_id, Some("user:mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn listing_filters_by_status() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Oranges", "1.00", 100).await;

    let orders = state.orders();
    let mut order_ids = Vec::new();
    for _ in 0..3 {
        let cart_id = cart_with(&state, "user:alice", &[(&product, 1)]).await;
        let detail = orders
            .create_order_from_cart("user:alice", &cart_id)
            .await
            .unwrap();
        order_ids.push(detail.order.id.unwrap().to_string());
    }
    orders
        .set_status(&order_ids[0], OrderStatus::Completed)
        .await
        .unwrap();

    let all = orders.list_all(None, 10, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let completed = orders
        .list_all(Some(OrderStatus::Completed), 10, 0)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);

    let pending = orders
        .list_all(Some(OrderStatus::Pending), 10, 0)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);

    let mine = orders.list_for_user("user:alice", 2, 0).await.unwrap();
    assert_eq!(mine.len(), 2);
}
