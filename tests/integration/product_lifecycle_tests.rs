// Adding, listing and removing products through the command handlers

use price_monitor::cli::{self, Command};
use price_monitor::store::ProductStore;
use price_monitor::AppError;

use super::*;

#[tokio::test]
async fn test_add_list_remove() -> anyhow::Result<()> {
    let env = test_env();

    cli::add_product(&env.config, new_product("Widget", "https://shop.example.com/widget", "29.99"))?;
    cli::add_product(&env.config, new_product("Gadget", "https://shop.example.com/gadget", "5"))?;

    let store = ProductStore::load(&env.config.storage.data_file)?;
    let names: Vec<_> = store.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Widget", "Gadget"]);
    assert!(store.products().iter().all(|p| !p.is_checked()));

    assert_eq!(cli::remove_product(&env.config, "Widget")?, 1);
    assert_eq!(cli::remove_product(&env.config, "Widget")?, 0);

    let store = ProductStore::load(&env.config.storage.data_file)?;
    assert_eq!(store.len(), 1);
    assert!(store.contains("Gadget"));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_name_rejected_and_document_unchanged() -> anyhow::Result<()> {
    let env = test_env();
    cli::add_product(&env.config, new_product("Widget", "https://shop.example.com/widget", "10"))?;
    let before = std::fs::read_to_string(&env.config.storage.data_file)?;

    let result = cli::run(
        Command::Add {
            url: "https://other.example.com/widget".to_string(),
            selector: "#price".to_string(),
            target: dec("8"),
            name: "Widget".to_string(),
        },
        &env.config,
    )
    .await;

    assert!(matches!(result, Err(AppError::DuplicateName { ref name }) if name == "Widget"));
    assert_eq!(std::fs::read_to_string(&env.config.storage.data_file)?, before);
    Ok(())
}

#[tokio::test]
async fn test_invalid_products_are_not_stored() {
    let env = test_env();

    let bad_url = cli::add_product(&env.config, new_product("Widget", "shop.example.com/widget", "10"));
    assert!(matches!(bad_url, Err(AppError::Validation(_))));

    let negative = cli::add_product(&env.config, new_product("Widget", "https://shop.example.com/widget", "-1"));
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let mut bad_selector = new_product("Widget", "https://shop.example.com/widget", "10");
    bad_selector.selector = "div >".to_string();
    assert!(matches!(cli::add_product(&env.config, bad_selector), Err(AppError::Validation(_))));

    assert!(!env.config.storage.data_file.exists());
}

#[tokio::test]
async fn test_document_format() -> anyhow::Result<()> {
    let env = test_env();
    cli::add_product(&env.config, new_product("Widget", "https://shop.example.com/widget", "29.99"))?;

    let raw = std::fs::read_to_string(&env.config.storage.data_file)?;
    assert!(raw.contains('\n'), "document should be pretty-printed");

    let document: serde_json::Value = serde_json::from_str(&raw)?;
    let product = &document["products"][0];
    assert_eq!(product["name"], "Widget");
    assert_eq!(product["selector"], ".price");
    assert_eq!(product["target_price"].as_f64(), Some(29.99));
    assert!(product["last_price"].is_null());
    assert!(product["last_checked"].is_null());
    assert!(product["added"].as_str().is_some());

    Ok(())
}

#[tokio::test]
async fn test_remove_unknown_product_leaves_no_file() -> anyhow::Result<()> {
    let env = test_env();
    cli::run(Command::Remove { name: "Nothing".to_string() }, &env.config).await?;
    assert!(!env.config.storage.data_file.exists());
    Ok(())
}
