use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryWorkforceRepository};
use crate::routes::with_analytics_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use workforce_ai::ai::HttpTextGenerator;
use workforce_ai::analytics::AnalyticsService;
use workforce_ai::cache::{CacheStore, MemoryCacheStore, ResponseCache, SqliteCacheStore};
use workforce_ai::config::{AppConfig, CacheConfig};
use workforce_ai::error::AppError;
use workforce_ai::telemetry;
use workforce_ai::workforce::{Organization, OrganizationId, TaskCsvImporter};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(seed_repository(&args)?);
    let generator = Arc::new(HttpTextGenerator::new(&config.ai)?);
    if !generator.is_configured() {
        warn!("AI_API_KEY is not set; insight and query endpoints will return 502");
    }
    let cache = ResponseCache::new(open_cache_store(&config.cache)?);
    let analytics_service = Arc::new(AnalyticsService::new(
        repository,
        generator,
        cache,
        config.cache.clone(),
    ));

    let app = with_analytics_routes(analytics_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "workforce analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn open_cache_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, AppError> {
    match &config.database_path {
        Some(path) => {
            info!(path = %path.display(), "using sqlite response cache");
            Ok(Arc::new(SqliteCacheStore::open(path)?))
        }
        None => {
            info!("using in-memory response cache");
            Ok(Arc::new(MemoryCacheStore::default()))
        }
    }
}

fn seed_repository(args: &ServeArgs) -> Result<InMemoryWorkforceRepository, AppError> {
    let repository = InMemoryWorkforceRepository::default();
    let organization_id = OrganizationId(args.organization.clone());
    repository.insert_organization(Organization {
        id: organization_id.clone(),
        name: args.organization.clone(),
    })?;

    if let Some(path) = &args.seed_csv {
        let imported = TaskCsvImporter::from_path(path, &organization_id)?;
        info!(
            organization_id = %organization_id,
            employees = imported.employees.len(),
            tasks = imported.tasks.len(),
            "seeded workforce records"
        );
        repository.load(&organization_id, imported)?;
    }

    Ok(repository)
}
