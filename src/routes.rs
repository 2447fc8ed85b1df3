use crate::{
    api::{draft, employee, holiday, passbook},
    auth::middleware::auth_middleware,
    config::Config,
    error::AdminError,
    extraction::ExtractionError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, error::JsonPayloadError, get, middleware::from_fn, web};
use anyhow::{Context, anyhow};
use serde_json::json;
use std::sync::Arc;

type PeerLimiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer limiter allowing `requests_per_min` with an equal burst.
fn build_limiter(requests_per_min: u32) -> anyhow::Result<PeerLimiter> {
    let per_ms = (60_000 / u64::from(requests_per_min.max(1))).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("must allow at least one request per minute"))?;
    Ok(Governor::new(&cfg))
}

/// Rate limiters shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    admin: Arc<PeerLimiter>,
    extract: Arc<PeerLimiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            admin: Arc::new(
                build_limiter(config.rate_admin_per_min).context("RATE_ADMIN_PER_MIN")?,
            ),
            extract: Arc::new(
                build_limiter(config.rate_extract_per_min).context("RATE_EXTRACT_PER_MIN")?,
            ),
        })
    }
}

/// JSON bodies sized for a base64 upload of `max_upload_bytes`.
///
/// Oversized bodies get the same message as an oversized image; other body
/// errors become a JSON 400.
pub fn json_config(max_upload_bytes: usize) -> web::JsonConfig {
    // base64 inflates uploads by a third
    let limit = max_upload_bytes * 4 / 3 + 64 * 1024;
    web::JsonConfig::default().limit(limit).error_handler(move |err, _req| {
        let rejection = match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                AdminError::Extraction(ExtractionError::TooLarge { limit: max_upload_bytes })
            }
            other => AdminError::BadRequest(other.to_string()),
        };
        rejection.into()
    })
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config, limiters: Limiters) {
    cfg.app_data(json_config(config.max_upload_bytes));
    cfg.service(health);

    // Staff-only routes
    cfg.service(
        web::scope(&config.admin_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiters.admin)
            .service(
                web::scope("/employees")
                    .service(web::resource("").route(web::get().to(employee::list_employees)))
                    // before /{sr_no} so "export" is not taken as an id
                    .service(
                        web::resource("/export").route(web::get().to(employee::export_employees)),
                    )
                    .service(
                        web::resource("/{sr_no}").route(web::get().to(employee::get_employee)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::add_holidays)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::resource("/passbook/extract")
                    .wrap(limiters.extract.clone())
                    .route(web::post().to(passbook::extract_passbook)),
            )
            .service(
                web::scope("/drafts")
                    .service(web::resource("").route(web::post().to(draft::create_draft)))
                    .service(
                        web::resource("/profile/{sr_no}")
                            .route(web::post().to(draft::create_edit_draft)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(draft::get_draft))
                            .route(web::patch().to(draft::update_draft))
                            .route(web::delete().to(draft::delete_draft)),
                    )
                    .service(
                        web::resource("/{id}/documents/{slot}")
                            .route(web::put().to(draft::put_document))
                            .route(web::get().to(draft::get_document)),
                    )
                    .service(
                        web::resource("/{id}/passbook")
                            .wrap(limiters.extract)
                            .route(web::post().to(draft::draft_passbook)),
                    )
                    .service(
                        web::resource("/{id}/submit").route(web::post().to(draft::submit_draft)),
                    ),
            ),
    );
}
