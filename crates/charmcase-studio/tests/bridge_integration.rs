//! Integration tests for the command bridge and headless runner.
//!
//! These tests wire the same pieces `main` wires: a config, the catalog
//! provider it selects, the catalog feeds, and an `AppState`, then push
//! JSON-lines scripts through `run_script` and inspect the responses.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use charmcase_studio::application::customize_case::CustomizerSession;
use charmcase_studio::infrastructure::catalog::mock::{MockCatalog, MockDelays};
use charmcase_studio::infrastructure::catalog::{provider_from_config, CatalogFeeds, CatalogProvider};
use charmcase_studio::infrastructure::storage::config::{AppConfig, CatalogSource};
use charmcase_studio::infrastructure::ui_bridge::script::{run_script, ScriptStats};
use charmcase_studio::infrastructure::ui_bridge::AppState;

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn state_for(config: &AppConfig, provider: Arc<dyn CatalogProvider>) -> Arc<AppState> {
    let session = CustomizerSession::new(config.session_settings().unwrap());
    let mut catalog = CatalogFeeds::spawn(provider);
    catalog.wait_settled().await;
    AppState::new(session, catalog, config.display.price_format())
}

async fn run(state: Arc<AppState>, script: &str) -> (ScriptStats, Vec<Value>) {
    let mut out = Vec::new();
    let stats = run_script(state, script.as_bytes(), &mut out).await.unwrap();
    let responses = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    (stats, responses)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("charmcase_it_{}_{name}", Uuid::new_v4()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_customization_script_prices_order() {
    // Arrange
    let config = AppConfig::default();
    let state = state_for(&config, Arc::new(MockCatalog::with_delays(MockDelays::NONE))).await;
    let script = r#"
# choose the phone and color
{"type":"SelectPhone","phone_id":"iphone-13-pro"}
{"type":"SelectColor","color_id":"sierra-blue"}

# Star + Moon, then remove the Star
{"type":"DropCharm","charm_id":"charm-1","x":100,"y":200}
{"type":"DropCharm","charm_id":"charm-3","x":200,"y":400}
{"type":"GetSession"}
{"type":"RemoveCharm","placement_id":"charm-1-0"}
{"type":"OrderSummary"}
"#;

    // Act
    let (stats, responses) = run(state, script).await;

    // Assert
    assert_eq!(stats, ScriptStats { commands: 7, failures: 0 });
    assert_eq!(responses[1]["data"]["color"]["display_name"], "Sierra Blue");
    assert_eq!(responses[4]["data"]["total_display"], "$30.97");
    assert_eq!(responses[5]["data"], true);
    let order = &responses[6]["data"];
    assert_eq!(order["total_display"], "$25.98");
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    assert_eq!(order["lines"][0]["placement_id"], "charm-3-1");
}

#[tokio::test]
async fn test_placement_ids_are_not_reused_after_clear() {
    let state = state_for(&AppConfig::default(), Arc::new(MockCatalog::with_delays(MockDelays::NONE))).await;
    let script = r#"{"type":"SelectPhone","phone_id":"iphone-13-pro"}
{"type":"DropCharm","charm_id":"charm-1","x":150,"y":300}
{"type":"ClearCharms"}
{"type":"DropCharm","charm_id":"charm-1","x":150,"y":300}
"#;

    let (_, responses) = run(state, script).await;

    assert_eq!(responses[1]["data"]["placement_id"], "charm-1-0");
    assert_eq!(responses[2]["data"], 1);
    assert_eq!(responses[3]["data"]["placement_id"], "charm-1-1");
}

#[tokio::test]
async fn test_display_config_controls_total_format() {
    // Arrange
    let mut config = AppConfig::default();
    config.display.currency_symbol = "€".to_string();
    config.display.symbol_after = true;
    config.display.decimal_separator = ",".to_string();
    let state = state_for(&config, Arc::new(MockCatalog::with_delays(MockDelays::NONE))).await;

    // Act
    let (_, responses) = run(state, "{\"type\":\"GetSession\"}\n").await;

    // Assert
    assert_eq!(responses[0]["data"]["total_display"], "19,99 €");
}

#[tokio::test]
async fn test_file_catalog_selected_by_config_serves_commands() {
    // Arrange: a one-charm catalog file.
    let catalog_path = temp_path("catalog.toml");
    std::fs::write(
        &catalog_path,
        r#"
[[charms]]
id = "anchor"
name = "Anchor Charm"
image_url = "anchor.png"
price = 2.5

[[phone_models]]
id = "pixel"
name = "Pixel"
case_image_url = "pixel.png"
"#,
    )
    .unwrap();
    let mut config = AppConfig::default();
    config.catalog.source = CatalogSource::File;
    config.catalog.path = Some(catalog_path.clone());
    let provider = provider_from_config(&config.catalog).unwrap();
    let state = state_for(&config, provider).await;

    // Act
    let (stats, responses) = run(
        state,
        r#"{"type":"GetCatalog"}
{"type":"SelectPhone","phone_id":"pixel"}
{"type":"DropCharm","charm_id":"anchor","x":150,"y":300}
{"type":"SelectColor","color_id":"gold"}
"#,
    )
    .await;

    // Assert
    assert_eq!(responses[0]["data"]["charms"]["items"][0]["name"], "Anchor Charm");
    assert_eq!(responses[0]["data"]["colors"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(responses[2]["data"]["price"], 2.5);
    // The file has no colors, so selecting one fails.
    assert_eq!(stats.failures, 1);
    assert_eq!(responses[3]["error"], "unknown color: gold");

    std::fs::remove_file(&catalog_path).ok();
}

#[tokio::test]
async fn test_missing_catalog_file_surfaces_feed_errors() {
    let mut config = AppConfig::default();
    config.catalog.source = CatalogSource::File;
    config.catalog.path = Some(temp_path("absent.toml"));
    let provider = provider_from_config(&config.catalog).unwrap();
    let state = state_for(&config, provider).await;

    let (_, responses) = run(state, "{\"type\":\"GetCatalog\"}\n").await;

    let charms = &responses[0]["data"]["charms"];
    assert_eq!(charms["is_loading"], false);
    assert!(charms["error"].as_str().unwrap().contains("I/O error reading catalog"));
}

#[tokio::test]
async fn test_pointer_cancel_and_focus_loss_abandon_gestures() {
    let state = state_for(&AppConfig::default(), Arc::new(MockCatalog::with_delays(MockDelays::NONE))).await;
    let script = r#"{"type":"SelectPhone","phone_id":"iphone-13-pro"}
{"type":"DropCharm","charm_id":"charm-1","x":150,"y":300}
{"type":"DropCharm","charm_id":"charm-2","x":60,"y":60}
{"type":"PointerEvent","event":{"phase":"Down","pointer":1,"placement":"charm-1-0","position":{"x":150,"y":300}}}
{"type":"PointerEvent","event":{"phase":"Cancel","pointer":1}}
{"type":"PointerEvent","event":{"phase":"Down","pointer":1,"placement":"charm-1-0","position":{"x":150,"y":300}}}
{"type":"PointerEvent","event":{"phase":"Down","pointer":2,"placement":"charm-2-1","position":{"x":60,"y":60}}}
{"type":"PointerEvent","event":{"phase":"FocusLost"}}
{"type":"PointerEvent","event":{"phase":"Up","pointer":1,"position":{"x":10,"y":10}}}
{"type":"GetSession"}
"#;

    let (stats, responses) = run(state, script).await;

    assert_eq!(stats.failures, 0);
    assert_eq!(responses[4]["data"]["outcome"], "Cancelled");
    assert_eq!(responses[7]["data"]["gestures"], 2);
    // Release after focus loss belongs to no gesture.
    assert_eq!(responses[8]["data"], Value::Null);
    assert_eq!(responses[9]["data"]["placements"][0]["x"], 50.0);
}

#[tokio::test]
async fn test_second_pointer_on_busy_placement_is_rejected() {
    let state = state_for(&AppConfig::default(), Arc::new(MockCatalog::with_delays(MockDelays::NONE))).await;
    let script = r#"{"type":"SelectPhone","phone_id":"iphone-13-pro"}
{"type":"DropCharm","charm_id":"charm-1","x":150,"y":300}
{"type":"PointerEvent","event":{"phase":"Down","pointer":1,"placement":"charm-1-0","position":{"x":150,"y":300}}}
{"type":"PointerEvent","event":{"phase":"Down","pointer":2,"placement":"charm-1-0","position":{"x":150,"y":300}}}
"#;

    let (stats, responses) = run(state, script).await;

    assert_eq!(stats.failures, 1);
    assert_eq!(responses[3]["success"], false);
}
