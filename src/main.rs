use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use erp_admin::client::UpstreamClient;
use erp_admin::config::Config;
use erp_admin::docs::ApiDoc;
use erp_admin::extraction::PassbookExtractor;
use erp_admin::extraction::ocr::{OcrTimeouts, TesseractCli};
use erp_admin::routes;
use erp_admin::utils::draft_store::DraftStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(upstream = %config.upstream_base_url, "Server starting...");

    let client = Data::new(UpstreamClient::from_config(&config));
    let drafts = Data::new(DraftStore::new(
        config.draft_capacity,
        Duration::from_secs(config.draft_ttl_secs),
    ));
    let extractor = Data::new(PassbookExtractor::new(
        Arc::new(TesseractCli::new(config.tesseract_bin.clone())),
        OcrTimeouts::from_config(&config),
        config.max_upload_bytes,
    ));

    let limiters = routes::Limiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(client.clone())
            .app_data(drafts.clone())
            .app_data(extractor.clone())
            .configure(|cfg| routes::configure(cfg, config.clone(), limiters.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
