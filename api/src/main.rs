use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use mc_api::{create_app, AppState};
use mc_core::repositories::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
use mc_core::services::{
    CodeCleanupService, DynVerificationService, VerificationService, VerificationServiceConfig,
};
use mc_infra::database::{DatabasePool, MySqlVerificationCodeRepository};
use mc_infra::email::create_email_service;
use mc_shared::config::{AppConfig, StoreBackend};
use mc_shared::logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        store = ?config.store,
        "Starting MailCode API server"
    );

    let (repository, pool) = build_repository(&config).await?;

    let email_service =
        create_email_service(&config.smtp).context("Failed to create email service")?;

    let verification_service: DynVerificationService = VerificationService::new(
        repository.clone(),
        email_service,
        VerificationServiceConfig::from(&config.verification),
    );

    let cleanup_task = Arc::new(CodeCleanupService::new(
        repository,
        config.verification.cleanup.clone(),
    ))
    .start_background_task();

    let state = web::Data::new(AppState::new(Arc::new(verification_service)));

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()))
        .keep_alive(Duration::from_secs(config.server.keep_alive))
        .client_request_timeout(Duration::from_secs(config.server.request_timeout));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = cleanup_task {
        handle.abort();
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Select the code store configured for this deployment
async fn build_repository(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn VerificationCodeRepository>, Option<DatabasePool>)> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory verification store, codes are lost on restart");
            Ok((Arc::new(InMemoryVerificationCodeRepository::new()), None))
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(config.database.clone())
                .await
                .context("Failed to connect to the database")?;
            let repository = MySqlVerificationCodeRepository::new(pool.get_pool().clone());
            if config.database.auto_migrate {
                repository
                    .ensure_schema()
                    .await
                    .context("Failed to prepare the verification table")?;
            }
            Ok((Arc::new(repository), Some(pool)))
        }
    }
}
