mod api;

use std::sync::Arc;

use actix_web::web::{Data, ServiceConfig};
use actix_web::{App, HttpServer, middleware};
use tokio::task;

use crate::config::Config;
use crate::ingest::Radar;

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(api::ingest_scan)
        .service(api::list_devices)
        .service(api::proximity);
}

/// Run the HTTP server on its own actix system. The handle resolves when the
/// server stops (SIGINT/SIGTERM) or fails to bind.
pub fn start(config: &Config, radar: Arc<Radar>) -> task::JoinHandle<std::io::Result<()>> {
    let bind = (config.bind.clone(), config.port);

    task::spawn_blocking(move || {
        tracing::info!("Starting web server on {}:{}", bind.0, bind.1);
        let sys = actix_rt::System::new();
        let radar = Data::from(radar);
        sys.block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(middleware::Logger::default())
                    .app_data(radar.clone())
                    .configure(routes)
            })
            .bind(bind)?
            .run()
            .await
        })
    })
}
