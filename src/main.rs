use std::sync::Arc;
use std::time::Duration;

use hello_api::config::{self, AppState, Config};
use hello_api::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load(&config_path)?;
    logger::init(&cfg)?;

    let runtime = server::build_runtime()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(cfg));
    logger::log_server_start(&state.config, &state.router.paths());

    let drain_timeout = Duration::from_secs(state.config.performance.write_timeout);
    let shutdown = server::Shutdown::new();

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let run = server::run(Arc::clone(&state), &shutdown);
            tokio::pin!(run);

            tokio::select! {
                // Only returns early when a listener fails to start
                result = &mut run => return result,
                () = server::wait_for_signal() => {}
            }

            logger::log_shutdown();
            shutdown.trigger();
            run.await
        })
        .await?;

    // Give in-flight connections a bounded chance to finish
    if tokio::time::timeout(drain_timeout, local).await.is_err() {
        logger::log_warning("Shutdown drain timed out, closing remaining connections");
    }

    Ok(())
}
