use procurement_plan_rust::{api, AppConfig, PricingService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 定价服务无状态，可在请求间共享
    let service = Arc::new(PricingService::from_config(&config.pricing));
    info!("Unit rules loaded: {}", service.rules().quantity_rule_tooltip());

    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/products/unit-rules     - 可分割单位与步进");
    info!("  POST /api/units/normalize         - 单位标准化");
    info!("  POST /api/pricing/quantize        - 数量量化与金额");
    info!("  POST /api/products/range/validate - 数量范围校验");
    info!("  POST /api/plans/validate          - 保存前校验与请求体");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
