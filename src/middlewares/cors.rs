use actix_cors::Cors;

pub fn create_cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url.trim_end_matches('/'))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
