use sea_orm::Database;
use tracing::info;

use drawnzones_backend::config::BackendConfig;
use drawnzones_backend::infra::mailer::SmtpMailer;
use drawnzones_backend::router::build_router;
use drawnzones_backend::state::AppState;

#[tokio::main]
async fn main() {
    drawnzones_core::tracing::init_tracing();

    let config = BackendConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = SmtpMailer::new(config.smtp_url.as_deref(), &config.email_from)
        .expect("invalid mailer configuration");

    let state = AppState {
        db,
        mailer,
        frontend_url: config.frontend_url,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("backend listening on {addr}");
    // ConnectInfo wiring lets handlers fall back to the peer address when no
    // x-forwarded-for header is present.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("server error");
}
