use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookshelf_api::app_config::{config_app, json_config};
use bookshelf_api::books_repository::{BookRepository, InMemoryBookRepository};
use bookshelf_api::settings::Settings;

const APP_NAME: &str = "bookshelf_api";

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry(settings: &Settings) -> anyhow::Result<()> {
    // Jaeger spans are exported in batch, only when an agent is expected to listen
    let telemetry = if settings.jaeger_enabled {
        global::set_text_map_propagator(TraceContextPropagator::new());
        #[allow(deprecated)]
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(APP_NAME)
            .install_batch(TokioCurrentThread)
            .context("Failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("Invalid log level")?;
    let formatting_layer = BunyanFormattingLayer::new(APP_NAME.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber")
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let books_repository: Arc<dyn BookRepository> = Arc::new(InMemoryBookRepository::default());

    let server = HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .app_data(json_config())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("Failed to bind {}:{}", settings.host, settings.port))?;

    tracing::info!(
        "Starting HTTP server at http://{}:{}",
        settings.host,
        settings.port
    );
    server.run().await.context("HTTP server failed")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_telemetry(&settings)?;

    let result = run(settings).await;
    if let Err(err) = &result {
        tracing::error!("Shutting down: {:#}", err);
    }
    opentelemetry::global::shutdown_tracer_provider();
    result
}
