use invoice_po_recon::{
    create_pool, router, AppConfig, AppState, MemoryStore, PgStore, VerificationService,
    VerificationStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 选择存储: 配置了数据库则用 PostgreSQL
    let store: Arc<dyn VerificationStore> = match &config.database.url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("Database pool created");
            Arc::new(PgStore::new(pool))
        }
        None => {
            info!("No database configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let service = Arc::new(VerificationService::new(store, config.tolerance.clone()));
    let state = AppState {
        service,
        export_dir: PathBuf::from(&config.export.dir),
    };
    let app = router(state);

    // 启动服务器
    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/verify            - compare one invoice/PO pair");
    info!("  POST   /api/verify/batch      - compare many pairs");
    info!("  POST   /api/discrepancies     - tolerance-based check");
    info!("  GET    /api/verifications     - history");
    info!("  GET    /api/stats             - statistics");
    info!("  GET    /api/export            - CSV export");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
