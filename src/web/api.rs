//! API handlers for the `/api/*` HTTP endpoints.

use actix_web::http::header;
use actix_web::web::{self, Bytes, Data};
use actix_web::{HttpResponse, get, post};

use crate::error::RadarError;
use crate::ingest::Radar;
use crate::probe::ScanBatch;
use crate::proximity::summarize;

// ============================================================================
// Probe ingest
// ============================================================================

/// Probes POST their latest sightings here. The body is decoded leniently and the
/// answer is always `ok` unless the store could not be written: probes run
/// unattended and will resend on their next cycle anyway.
#[post("/api/scan")]
pub async fn ingest_scan(radar: Data<Radar>, body: Bytes) -> Result<HttpResponse, RadarError> {
    let batch = ScanBatch::from_json(&body);
    let now = chrono::Utc::now().timestamp();
    let radar = radar.into_inner();

    let summary = web::block(move || radar.ingest(&batch, now)).await??;
    tracing::info!(
        "Scan batch: {} accepted, {} skipped, {} evicted",
        summary.accepted,
        summary.invalid_address + summary.noise + summary.malformed,
        summary.evicted
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

// ============================================================================
// Roster queries
// ============================================================================

/// Current roster verbatim
#[get("/api/devices")]
pub async fn list_devices(radar: Data<Radar>) -> Result<HttpResponse, RadarError> {
    let radar = radar.into_inner();
    let entries = web::block(move || radar.list()).await??;

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .json(entries))
}

/// Roster ordered by signal strength with distance estimates and type counts
#[get("/api/proximity")]
pub async fn proximity(radar: Data<Radar>) -> Result<HttpResponse, RadarError> {
    let radar = radar.into_inner();
    let entries = web::block(move || radar.list()).await??;

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .json(summarize(entries)))
}
