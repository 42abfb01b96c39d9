use std::sync::Arc;

use ticker_logos::config::{AppState, Config};
use ticker_logos::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension, e.g. `ticker_logos /etc/ticker_logos/config`
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // A missing logos directory is fatal
    let state = match AppState::from_config(cfg) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            logger::log_error(&format!("Cannot start: {e}"));
            return Err(e.into());
        }
    };

    let listener = server::create_listener(addr, state.config.performance.backlog)?;
    logger::log_server_start(&addr, &state.config, state.index.ticker_count());

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server_loop(
            listener,
            state,
            Arc::clone(&signals.shutdown),
        ))
        .await?;

    Ok(())
}
