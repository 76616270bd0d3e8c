//! End-to-end boot behavior.

use std::sync::Arc;

use armature::bootstrap::bootstrap;
use armature::error::{ConfigurationError, LifecycleError};
use armature::ModuleState;

mod common;
use common::{default_store_config, TestApp};

#[tokio::test]
async fn test_boot_wires_one_model_through_the_default_store() {
    let app = TestApp::new("boot-default");
    app.write_config(&default_store_config(&app, 28601));
    app.write_model("user.toml", "identity = \"user\"\n");

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    boot.registry.init_all(&boot.ctx).await.unwrap();

    // exactly one store instance, named default and started
    let store = boot.ctx.stores.get_cached("default").await.unwrap();
    assert_eq!(store.name(), "default");
    assert!(store.started());
    assert_eq!(boot.ctx.stores.len().await, 1);

    // one model binding pointing at it
    let bindings = boot.model.bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].identity, "user");
    assert_eq!(bindings[0].store_name, "default");
    assert_eq!(bindings[0].global_id, "User");

    // and the handle resolves in shared scope
    assert!(boot.ctx.globals.resolve("User").is_some());

    // a second resolution returns the identical cached instance
    let config = boot.ctx.config();
    let again = boot.ctx.stores.get_store(&config, "default").await.unwrap();
    assert!(Arc::ptr_eq(&store, &again));

    boot.coordinator.shutdown().await;
}

#[tokio::test]
async fn test_missing_default_store_fails_before_any_resolution() {
    let app = TestApp::new("boot-nostore");
    app.write_config("port = 28602\n");
    app.write_model("user.toml", "identity = \"user\"\n");

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    let err = boot.registry.init_all(&boot.ctx).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Configuration(ConfigurationError::NoDefaultStore(_))
    ));
    // configure failed before a store was resolved
    assert!(boot.ctx.stores.is_empty().await);
    assert!(boot.ctx.globals.is_empty());
}

#[tokio::test]
async fn test_explicitly_named_but_unconfigured_store_fails() {
    let app = TestApp::new("boot-badstore");
    app.write_config(&default_store_config(&app, 28603));
    app.write_model(
        "session.toml",
        "identity = \"session\"\nstore = \"sessions\"\n",
    );

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    let err = boot.registry.init_all(&boot.ctx).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Configuration(ConfigurationError::MissingStore(ref name)) if name == "sessions"
    ));
}

#[tokio::test]
async fn test_stop_leaves_no_resolvable_globals() {
    let app = TestApp::new("boot-stop");
    app.write_config(&default_store_config(&app, 28604));
    app.write_model("user.toml", "identity = \"user\"\n");
    app.write_model("post.toml", "identity = \"post\"\n");

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    boot.registry.init_all(&boot.ctx).await.unwrap();
    assert!(boot.ctx.globals.resolve("User").is_some());
    assert!(boot.ctx.globals.resolve("Post").is_some());

    boot.registry.stop_all(&boot.ctx).await;

    assert!(boot.ctx.globals.resolve("User").is_none());
    assert!(boot.ctx.globals.resolve("Post").is_none());
    assert!(boot.ctx.stores.is_empty().await);
    assert_eq!(
        boot.registry.state_of("model").await,
        Some(ModuleState::Stopped)
    );
}

#[tokio::test]
async fn test_duplicate_global_ids_abort_boot() {
    let app = TestApp::new("boot-dup");
    app.write_config(&default_store_config(&app, 28605));
    app.write_model("user.toml", "identity = \"user\"\nglobal_id = \"Account\"\n");
    app.write_model("admin.toml", "identity = \"admin\"\nglobal_id = \"Account\"\n");

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    let err = boot.registry.init_all(&boot.ctx).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Configuration(ConfigurationError::DuplicateGlobalId(_))
    ));
}

#[tokio::test]
async fn test_boot_appends_lint_globals() {
    let app = TestApp::new("boot-eslint");
    app.write_config(&default_store_config(&app, 28606));
    app.write_model("user.toml", "identity = \"user\"\n");
    std::fs::write(app.dir.join(".eslintrc"), r#"{"globals": {}}"#).unwrap();

    let boot = bootstrap(app.load_config(), app.dir.clone(), true, None).await;
    boot.registry.init_all(&boot.ctx).await.unwrap();

    let text = std::fs::read_to_string(app.dir.join(".eslintrc")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["globals"]["User"], serde_json::json!(true));

    boot.coordinator.shutdown().await;
}
