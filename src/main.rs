use actix_web::{App, HttpServer, middleware, web};
use std::sync::Arc;
use clap::Parser;
use tracing::{info, warn};
mod api;
use crate::api::{
    health::health_config,
    job::{handlers::job_config, JobService},
    validation,
};
mod auth;
mod cli;
mod config;
mod db;
mod logging;
mod shutdown;
use crate::auth::{AuthGateway, JwtAuthGateway, UserId};
use crate::cli::{Cli, Command};
use crate::db::{JobRepository, MemoryJobRepository, PgJobRepository};
use crate::shutdown::ShutdownCoordinator;

fn config_error(msg: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, msg)
}

fn other_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = config::Config::from_env().map_err(config_error)?;

    logging::init(&config.log_dir)?;

    let gateway: Arc<dyn AuthGateway> =
        Arc::new(JwtAuthGateway::new(&config.jwt_secret, config.jwt_expiry_hours));

    match cli.command() {
        Command::IssueToken { user } => {
            let token = gateway
                .issue_token(&UserId::new(user.as_str()))
                .map_err(other_error)?;
            println!("{}", token);
            Ok(())
        }
        Command::Migrate => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| config_error("DATABASE_URL must be set to run migrations".to_string()))?;
            let pool = db::connection::get_connection(database_url, config.max_db_connections)
                .await
                .map_err(other_error)?;
            db::migrations::run_migrations(&pool).await.map_err(other_error)?;
            pool.close().await;
            Ok(())
        }
        Command::Serve => serve(config, gateway).await,
    }
}

async fn serve(config: config::Config, gateway: Arc<dyn AuthGateway>) -> std::io::Result<()> {
    info!("Starting job-tracker application");
    info!("Configuration loaded successfully:");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Token lifetime: {} hours", config.jwt_expiry_hours);

    let repository: Arc<dyn JobRepository> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::connection::get_connection(database_url, config.max_db_connections)
                .await
                .map_err(other_error)?;
            info!("Database connection pool established");

            // Auto-migrate when starting the server
            db::migrations::run_migrations(&pool).await.map_err(other_error)?;

            Arc::new(PgJobRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; job records are kept in memory and lost on exit");
            Arc::new(MemoryJobRepository::new())
        }
    };

    let job_service = web::Data::new(JobService::new(repository.clone()));
    let gateway_data: web::Data<dyn AuthGateway> = web::Data::from(gateway);
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(job_service.clone())
            .app_data(gateway_data.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .configure(health_config)
            .configure(job_config)
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))?
        .disable_signals()
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, repository)
        .wait_for_shutdown()
        .await
}
