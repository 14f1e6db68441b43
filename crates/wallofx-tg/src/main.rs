use futures::prelude::*;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing::{error, info, warn};
use wallofx_tg::tracing_err;

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found, reading the config from the environment only")
    }

    let logging_task = wallofx_tg::init_logging();

    wallofx_tg::init_metrics();

    let bot = AssertUnwindSafe(async {
        let result = try_main().await;

        result.map(|()| ExitCode::SUCCESS).unwrap_or_else(|err| {
            error!(
                err = tracing_err(&err),
                kind = err.kind_label(),
                "Bot stopped with an error"
            );
            ExitCode::FAILURE
        })
    })
    .catch_unwind()
    .unwrap_or_else(|_| {
        error!("Bot stopped due to a panic");
        ExitCode::FAILURE
    });

    // Rendering is CPU-bound, so in debug builds a graceful shutdown waits for
    // the slow unoptimized renders, and teloxide's own shutdown is slow too:
    // https://github.com/teloxide/teloxide/issues/711
    let exit_code = if cfg!(debug_assertions) {
        tokio::select! {
            exit_code = bot => exit_code,
            () = abort_signal() => ExitCode::SUCCESS,
        }
    } else {
        bot.await
    };

    // Flushes the logs buffered for Loki
    logging_task.shutdown().await;

    exit_code
}

async fn try_main() -> wallofx_tg::Result {
    let config = wallofx_tg::Config::load()?;
    wallofx_tg::run(config).await
}

async fn abort_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, dropping in-flight requests"),
        Err(err) => warn!(err = tracing_err(&err), "Failed to listen for Ctrl+C"),
    }
}
