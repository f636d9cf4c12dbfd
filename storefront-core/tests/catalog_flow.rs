//! Catalog integration tests: slugs, tree structure, delete guards, stock
//! primitives and the wishlist.

mod common;

use common::{dec, seed_category, seed_product, state, stock_of};
use storefront_core::AppError;
use storefront_core::db::models::{CategoryCreate, CategoryUpdate, ProductCreate, ProductUpdate};

#[tokio::test]
async fn category_slug_is_generated_and_unique() {
    let state = state().await;
    let catalog = state.catalog();

    let category = catalog
        .create_category(CategoryCreate {
            name: "Fresh Vegetables".to_string(),
            description: None,
            image: None,
            parent_id: None,
        })
        .await
        .unwrap();
    assert_eq!(category.slug, "fresh-vegetables");

    let err = catalog
        .create_category(CategoryCreate {
            name: "Fresh  Vegetables".to_string(),
            description: None,
            image: None,
            parent_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn renaming_a_category_regenerates_its_slug() {
    let state = state().await;
    let catalog = state.catalog();
    let id = seed_category(&state, "Greenhouses").await;

    let updated = catalog
        .update_category(
            &id,
            CategoryUpdate {
                name: Some("Glass Houses".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.slug, "glass-houses");
    assert_eq!(updated.name, "Glass Houses");
}

#[tokio::test]
async fn category_tree_nests_children_under_parents() {
    let state = state().await;
    let catalog = state.catalog();
    let root = seed_category(&state, "Produce").await;

    catalog
        .create_category(CategoryCreate {
            name: "Vegetables".to_string(),
            description: None,
            image: None,
            parent_id: Some(root.clone()),
        })
        .await
        .unwrap();
    catalog
        .create_category(CategoryCreate {
            name: "Fruits".to_string(),
            description: None,
            image: None,
            parent_id: Some(root.clone()),
        })
        .await
        .unwrap();

    let tree = catalog.category_tree().await.unwrap();
    assert_eq!(tree.len(), 1);
    let children: Vec<&str> = tree[0].children.iter().map(|n| n.category.name.as_str()).collect();
    assert_eq!(children, vec!["Fruits", "Vegetables"]);

    let roots = catalog.list_categories(None).await.unwrap();
    assert_eq!(roots.len(), 1);
    let subs = catalog.list_categories(Some(&root)).await.unwrap();
    assert_eq!(subs.len(), 2);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Dairy").await;
    let product = seed_product(&state, &category, "Goat Cheese", "7.00", 5).await;

    let err = catalog.delete_category(&category).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Once the product is gone the category can go too
    catalog.delete_product(&product).await.unwrap();
    catalog.delete_category(&category).await.unwrap();

    let err = catalog.get_category(&category).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn product_slug_conflicts_are_rejected() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Pantry").await;
    seed_product(&state, &category, "Olive Oil", "10.00", 5).await;

    let err = catalog
        .create_product(ProductCreate {
            title: "Olive  Oil".to_string(),
            description: String::new(),
            price: dec("12.00"),
            stock: None,
            unit: None,
            images: Vec::new(),
            attributes: None,
            category_id: category.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn product_create_rejects_bad_input() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Pantry").await;

    let err = catalog
        .create_product(ProductCreate {
            title: "Vinegar".to_string(),
            description: String::new(),
            price: dec("-1.00"),
            stock: None,
            unit: None,
            images: Vec::new(),
            attributes: None,
            category_id: category.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = catalog
        .create_product(ProductCreate {
            title: "Vinegar".to_string(),
            description: String::new(),
            price: dec("1.00"),
            stock: None,
            unit: None,
            images: Vec::new(),
            attributes: None,
            category_id: "category:doesnotexist".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn product_with_order_history_cannot_be_deleted() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Lemons", "1.00", 10).await;

    let carts = state.carts();
    let cart = carts.get_or_create_cart(Some("user:alice"), None).await.unwrap();
    let cart_id = cart.id.unwrap().to_string();
    carts.add_item(&cart_id, &product, 1).await.unwrap();
    state
        .orders()
        .create_order_from_cart("user:alice", &cart_id)
        .await
        .unwrap();

    let err = catalog.delete_product(&product).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Deactivation remains available for retired products
    let updated = catalog
        .update_product(
            &product,
            ProductUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
}

#[tokio::test]
async fn deleting_a_product_cascades_to_carts_and_wishlists() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Mangoes", "3.00", 10).await;

    let carts = state.carts();
    let cart = carts.get_or_create_cart(Some("user:alice"), None).await.unwrap();
    let cart_id = cart.id.unwrap().to_string();
    carts.add_item(&cart_id, &product, 2).await.unwrap();
    state.wishlist().add("user:alice", &product).await.unwrap();

    catalog.delete_product(&product).await.unwrap();

    let totals = carts.totals(&cart_id).await.unwrap();
    assert!(totals.items.is_empty());
    assert_eq!(state.wishlist().count("user:alice").await.unwrap(), 0);
}

#[tokio::test]
async fn stock_primitives_enforce_the_floor() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Bananas", "1.00", 5).await;

    let updated = catalog.decrement_stock(&product, 3).await.unwrap();
    assert_eq!(updated.stock, 2);

    let err = catalog.decrement_stock(&product, 3).await.unwrap_err();
    match err {
        AppError::InsufficientStock { requested, .. } => assert_eq!(requested, 3),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(stock_of(&state, &product).await, 2);

    let restored = catalog.increment_stock(&product, 8).await.unwrap();
    assert_eq!(restored.stock, 10);

    let err = catalog.decrement_stock(&product, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn product_images_can_be_added_and_removed() {
    let state = state().await;
    let catalog = state.catalog();
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Dates", "9.00", 5).await;

    let updated = catalog
        .add_product_image(&product, "https://cdn.example.com/dates.webp")
        .await
        .unwrap();
    assert_eq!(updated.images.len(), 1);

    // Adding the same URL twice is a no-op
    let updated = catalog
        .add_product_image(&product, "https://cdn.example.com/dates.webp")
        .await
        .unwrap();
    assert_eq!(updated.images.len(), 1);

    let updated = catalog
        .remove_product_image(&product, "https://cdn.example.com/dates.webp")
        .await
        .unwrap();
    assert!(updated.images.is_empty());
}

#[tokio::test]
async fn wishlist_is_unique_per_user_and_product() {
    let state = state().await;
    let category = seed_category(&state, "Fruit").await;
    let product = seed_product(&state, &category, "Pomegranates", "4.00", 5).await;

    let wishlist = state.wishlist();
    wishlist.add("user:alice", &product).await.unwrap();

    let err = wishlist.add("user:alice", &product).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert!(wishlist.contains("user:alice", &product).await.unwrap());
    assert_eq!(wishlist.count("user:alice").await.unwrap(), 1);
    assert_eq!(wishlist.list("user:alice").await.unwrap().len(), 1);

    // Another user's wishlist is unaffected
    assert!(!wishlist.contains("user:bob", &product).await.unwrap());

    wishlist.remove("user:alice", &product).await.unwrap();
    let err = wishlist.remove("user:alice", &product).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(wishlist.count("user:alice").await.unwrap(), 0);
}
