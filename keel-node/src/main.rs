use clap::Parser;
use tracing::{error, info, warn};

use keel_common::{CancellationToken, KeelError};
use keel_node::{
    cli::Args,
    config::NodeSettings,
    driver::select_driver,
    runtime::sequencer::{start, Probes},
    setup::{ensure_settings, init_logging},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Arguments and settings
    let args = Args::parse();
    let created = ensure_settings(&args.config)?;
    let mut settings = NodeSettings::load_from_file(&args.config)?;
    if let Some(kind) = args.driver {
        settings.driver = kind;
    }
    if let Some(dir) = args.data_dir.clone() {
        settings.set_data_dir(dir);
    }

    // 2. Logging; the guard flushes the startup log on exit
    let _guard = init_logging(&args.log_dir, &settings.node.name)?;
    info!("--- starting keel node {} ---", settings.node.name);
    if created {
        info!("⚠️ settings not found, wrote defaults to {}", args.config.display());
    }
    info!("Config: {}", args.config.display());

    // 3. Driver, installed once for the whole process
    let driver = select_driver(settings.driver);
    let ctx = driver.context();
    ctx.install_global()?;

    // 4. Startup
    let cancel = CancellationToken::new();
    let probes = Probes::from_settings(&settings.probes);
    let handle = match start(ctx, &settings, probes, cancel.clone()).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("startup failed: {}", e);
            if let Err(e) = driver.shutdown().await {
                warn!("shutdown error: {}", e);
            }
            return Err(e.into());
        }
    };
    info!("node started, press Ctrl+C to stop");

    // 5. Wait for every stage, then for an interrupt
    let join = handle.join();
    tokio::pin!(join);
    let outcome = tokio::select! {
        res = &mut join => res,
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 interrupt received, stopping");
            cancel.cancel();
            match join.await {
                Err(KeelError::Cancelled) => Ok(()),
                other => other,
            }
        }
    };

    if outcome.is_ok() && !cancel.is_cancelled() {
        info!("✅ all stages started");
        tokio::signal::ctrl_c().await?;
        info!("🛑 interrupt received, stopping");
        cancel.cancel();
    }

    if let Err(e) = driver.shutdown().await {
        warn!("shutdown error: {}", e);
    }
    match outcome {
        Ok(()) => {
            info!("👋 stopped");
            Ok(())
        }
        Err(e) => {
            error!("node stopped with error: {}", e);
            Err(e.into())
        }
    }
}
