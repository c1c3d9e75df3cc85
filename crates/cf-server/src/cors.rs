use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build a permissive-by-default CORS layer from the configured origin
///
/// `"*"` allows any origin; anything else is parsed as a single explicit
/// origin, mirroring the gateway's `synapse-server::cors` origin handling
/// narrowed to this spec's single-string `server.cors.origin` option.
#[must_use]
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any);

    if origin == "*" {
        layer.allow_origin(AllowOrigin::any())
    } else {
        match origin.parse() {
            Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
            Err(_) => {
                tracing::warn!(%origin, "invalid server.cors.origin, falling back to any");
                layer.allow_origin(AllowOrigin::any())
            }
        }
    }
}
