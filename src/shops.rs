use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// Embedded at compile time so the presets cannot go missing at runtime.
const SHOP_PRESETS: &str = include_str!("../shops.toml");

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShopProfile {
    pub route: String,
    pub name: String,
    pub gstin: String,
    pub address: String,
    pub phones: Vec<String>,
    pub email: String,
    pub state: String,
    pub state_code: String,
    pub bank_name: String,
    pub bank_address: String,
    pub bank_account: String,
    pub ifsc: String,
}

#[derive(Deserialize)]
struct PresetFile {
    shop: Vec<ShopProfile>,
}

static PRESETS: LazyLock<Vec<ShopProfile>> = LazyLock::new(|| {
    let file: PresetFile =
        toml::from_str(SHOP_PRESETS).expect("Failed to parse embedded shops.toml");
    assert!(!file.shop.is_empty(), "shops.toml must define at least one shop");
    file.shop
});

impl ShopProfile {
    /// Picks the preset for a route key, falling back to the first preset.
    pub fn for_route(route: Option<&str>) -> Self {
        let presets = &*PRESETS;
        route
            .and_then(|key| presets.iter().find(|p| p.route == key))
            .unwrap_or(&presets[0])
            .clone()
    }

    pub fn routes() -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.route.as_str()).collect()
    }

    pub fn phone_line(&self) -> String {
        self.phones.join(", ")
    }
}
