//! On-disk persistence: state survives a close/reopen cycle.

use storefront_core::{AppState, Config};
use storefront_core::db::models::CategoryCreate;

#[tokio::test]
async fn catalog_survives_reopen() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data_dir = tmp.path().join("db").to_string_lossy().into_owned();

    let category_id = {
        let state = AppState::new(Config::with_data_dir(&data_dir))
            .await
            .expect("open state");
        let category = state
            .catalog()
            .create_category(CategoryCreate {
                name: "Vegetables".to_string(),
                description: Some("Fresh organic vegetables".to_string()),
                image: None,
                parent_id: None,
            })
            .await
            .expect("create category");
        category.id.expect("category id").to_string()
        // state dropped here, database closed
    };

    let reopened = AppState::new(Config::with_data_dir(&data_dir))
        .await
        .expect("reopen state");
    let category = reopened
        .catalog()
        .get_category(&category_id)
        .await
        .expect("category persisted");
    assert_eq!(category.slug, "vegetables");
    assert_eq!(category.description.as_deref(), Some("Fresh organic vegetables"));
}
