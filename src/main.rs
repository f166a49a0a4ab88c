use std::sync::Arc;

mod config;
mod error;
mod forwarder;
mod handler;
mod http;
mod logger;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(cfg)?);

    state.store.ensure_dir().await.map_err(|e| {
        format!(
            "Cannot create upload directory '{}': {e}",
            state.store.dir().display()
        )
    })?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &state.config, state.forwarder.endpoint_url());

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run_server(listener, state, signals).await?;
    logger::log_info("Server stopped");
    Ok(())
}
