use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod render;
mod routing;
mod server;
mod storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv()?;
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging)?;

    let router = routing::PathRouter::new(&cfg.application.prefix)?;
    let store = storage::PageStore::open(&cfg.application.pages_dir).map_err(|e| {
        format!(
            "Failed to create pages directory '{}': {e}",
            cfg.application.pages_dir
        )
    })?;
    logger::log_info(&format!(
        "[CONFIG] Pages stored in {}",
        store.dir().display()
    ));
    let renderer = render::HtmlTemplates::load(&cfg.application.templates_dir)?;

    // Worker thread count from configuration, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }
    let runtime = runtime_builder.build()?;

    let state = Arc::new(config::AppState::new(
        cfg,
        router,
        store,
        Arc::new(renderer),
    ));
    runtime.block_on(async_main(state))
}

async fn async_main(state: Arc<config::AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &state.config);

    server::run(listener, state, server::signal::shutdown_signal()).await;
    Ok(())
}
