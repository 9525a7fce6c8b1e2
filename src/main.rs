use anyhow::Result;
use asset_gallery::{
    config::{AppConfig, Mode},
    handlers::{
        asset_reader::AssetReader, asset_uploader::AssetUploader, gateway_handlers::GatewayState,
    },
    models::envelope::LambdaResponse,
    routes,
    services::{
        recognition_service::{LabelDetector, RekognitionDetector},
        storage_service::{ObjectStore, S3ObjectStore},
    },
};
use aws_config::BehaviorVersion;
use axum::Router;
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting asset-gallery with config: {:?}", cfg);

    // --- AWS clients, built once per process ---
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(
        aws_sdk_s3::Client::new(&aws),
        cfg.bucket.clone(),
    ));

    match cfg.mode {
        Mode::Reader => run_reader(AssetReader::new(store)).await,
        Mode::Uploader => {
            let uploader = build_uploader(&cfg, &aws, store)?;
            run_uploader(uploader).await
        }
        Mode::Serve => {
            let uploader = build_uploader(&cfg, &aws, store.clone())?;
            let state = GatewayState {
                reader: Arc::new(AssetReader::new(store.clone())),
                uploader: Arc::new(uploader),
                store,
            };
            serve(&cfg, state).await
        }
    }
}

fn build_uploader(
    cfg: &AppConfig,
    aws: &aws_config::SdkConfig,
    store: Arc<dyn ObjectStore>,
) -> Result<AssetUploader> {
    let detector: Arc<dyn LabelDetector> = Arc::new(RekognitionDetector::new(
        aws_sdk_rekognition::Client::new(aws),
        cfg.bucket.clone(),
    ));
    Ok(AssetUploader::new(store, detector, cfg.notification_target()?))
}

/// Serve the reader through the Lambda runtime. The event payload is ignored.
async fn run_reader(reader: AssetReader) -> Result<()> {
    let reader = Arc::new(reader);
    lambda_runtime::run(service_fn(move |_event: LambdaEvent<Value>| {
        let reader = reader.clone();
        async move { Ok::<LambdaResponse, lambda_runtime::Error>(reader.handle().await) }
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}

/// Serve the uploader through the Lambda runtime.
async fn run_uploader(uploader: AssetUploader) -> Result<()> {
    let uploader = Arc::new(uploader);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let uploader = uploader.clone();
        async move {
            Ok::<LambdaResponse, lambda_runtime::Error>(uploader.handle_event(event.payload).await)
        }
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}

/// Run the local HTTP gateway until the process is stopped.
async fn serve(cfg: &AppConfig, state: GatewayState) -> Result<()> {
    let app: Router = routes::routes::routes().with_state(state);

    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
