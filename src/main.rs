use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use leadforge_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{ClaudeClient, ContentGenerator, LeadSource, PlacesClient, StripeService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 外部服务
    let stripe_service = StripeService::new(config.stripe.clone());
    let lead_source: Arc<dyn LeadSource> = Arc::new(PlacesClient::new(config.places.clone()));
    let generator: Arc<dyn ContentGenerator> = Arc::new(ClaudeClient::new(config.claude.clone()));

    // 业务服务
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone());
    let entitlement_service = EntitlementService::new(pool.clone());
    let customization_service = CustomizationService::new(pool.clone());
    let import_service = ImportService::new(pool.clone());
    let lead_service = LeadService::new(pool.clone());
    let billing_service = BillingService::new(pool.clone(), stripe_service);
    let outreach_service = OutreachService::new(
        entitlement_service,
        customization_service,
        import_service.clone(),
        lead_service.clone(),
        lead_source,
        generator,
        config.stripe.frontend_url.clone(),
    );

    // 后台任务
    tasks::spawn_all(&config.usage, billing_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let frontend_url = config.stripe.frontend_url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&frontend_url))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(import_service.clone()))
            .app_data(web::Data::new(lead_service.clone()))
            .app_data(web::Data::new(billing_service.clone()))
            .app_data(web::Data::new(outreach_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::business_config)
                    .configure(handlers::outreach_config)
                    .configure(handlers::billing_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
