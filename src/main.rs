use std::process::ExitCode;
use std::sync::Arc;

use dirserve::config::{AppState, Config};
use dirserve::{logger, server, StartupError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[FATAL] {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    // Optional first argument: config file path, extension optional
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    logger::init(&cfg).map_err(StartupError::Logger)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);

    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

    logger::log_server_start(&addr, state.site.root(), &state.config);
    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
