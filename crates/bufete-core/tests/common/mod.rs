#![allow(dead_code)]
use bufete_core::CacheParams;
use serde_json::{Value, json};

/// Query parameters of a filtered blog listing, in request order.
pub fn listing_params() -> Vec<(&'static str, Value)> {
    vec![
        ("page", json!(2)),
        ("per_page", json!(10)),
        ("category", json!("derecho-laboral")),
        ("search", json!("despido")),
    ]
}

/// Builds `CacheParams` by inserting pairs in the given order.
pub fn params_in_order(pairs: &[(&str, Value)]) -> CacheParams {
    let mut params = CacheParams::new();
    for (name, value) in pairs {
        params.insert(*name, value.clone());
    }
    params
}

/// A cached listing payload shaped like the public API responses.
pub fn listing_payload() -> Value {
    json!({
        "success": true,
        "data": [
            {"slug": "despido-improcedente", "title": "Despido improcedente"},
            {"slug": "herencias", "title": "Herencias sin testamento"}
        ]
    })
}
