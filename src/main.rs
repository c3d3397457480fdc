use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use estateflow_sync::config::Settings;
use estateflow_sync::core::{Library, Reconciler, StartupSync, Workspace};
use estateflow_sync::routes::{self, AppState};
use estateflow_sync::services::{
    GeminiClient, LocalCache, MemoryStore, Persistence, RowStore, SheetsClient, SupabaseClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging.level, &settings.logging.format);
    info!("Starting EstateFlow sync service...");

    // Row-store: hosted when configured, otherwise process-local
    let store: Arc<dyn RowStore> = match (&settings.store.url, &settings.store.api_key) {
        (Some(url), Some(key)) => {
            info!("Using Supabase store at {}", url);
            Arc::new(SupabaseClient::new(url.clone(), key.clone(), settings.store.timeout()))
        }
        (Some(_), None) => {
            warn!("Store URL is set without an API key, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
        _ => {
            warn!("No store configured, running on the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let persistence = Persistence::new(store);

    let gemini = Arc::new(GeminiClient::new(
        settings.gemini.base_url.clone(),
        settings.gemini.api_key.clone(),
        settings.gemini.matching_model.clone(),
        settings.gemini.answering_model.clone(),
        settings.gemini.timeout(),
    ));
    if !gemini.has_credential() {
        warn!("No Gemini API key configured; matching requests will be rejected");
    }

    let sheets = Arc::new(SheetsClient::new(
        settings.sheets.base_url.clone(),
        settings.sheets.timeout(),
    ));
    let cache = Arc::new(LocalCache::new(&settings.cache.path, settings.cache.l1_capacity));

    let workspace = Arc::new(Workspace::default());
    let library = Library::new(workspace.clone(), persistence.clone());
    let snapshot = library.load().await;
    info!(
        "Workspace ready (cloud connected: {}, {} leads, {} properties)",
        snapshot.cloud_connected,
        snapshot.leads.len(),
        snapshot.properties.len()
    );

    let reconciler = Arc::new(Reconciler::new(sheets, persistence, cache, workspace.clone()));

    let startup = reconciler.clone();
    actix_web::rt::spawn(async move {
        match startup.restore().await {
            StartupSync::Remote(Some(report)) | StartupSync::Cached(Ok(report)) => {
                info!("Startup sync loaded {} leads from {}", report.leads, report.sheet_id)
            }
            StartupSync::Remote(None) => warn!("Startup sync did not complete"),
            StartupSync::Cached(Err(e)) => error!("Startup sync failed: {}", e),
            StartupSync::Defaults => {}
        }
    });

    let app_state = AppState {
        workspace,
        library,
        reconciler,
        gemini,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
