use std::process::ExitCode;

use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::{error, info, warn};
use uuid::Uuid;

fn load_config() -> anyhow::Result<configs::AppConfig> {
    // config.toml first, then defaults plus DATABASE_URL
    configs::AppConfig::load_and_validate().or_else(|file_err| {
        configs::AppConfig::from_env().map_err(|env_err| anyhow::anyhow!("{file_err}; {env_err}"))
    })
}

async fn run(cfg: &configs::AppConfig) -> anyhow::Result<service::consistency::AuditReport> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        info!(service = "audit", event = "migrate", "applying schema migrations");
        migration::Migrator::up(&db, None).await?;
    }
    let report = service::consistency::audit(&db).await?;
    db.close().await?;
    Ok(report)
}

fn main() -> ExitCode {
    dotenv().ok();
    let loaded = load_config();
    let format = loaded.as_ref().map(|c| c.logging.format.clone()).unwrap_or_default();
    common::utils::logging::init_logging_with_format(&format);

    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "audit", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let run_id = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "audit", event = "panic", %run_id, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.runtime.worker_threads { builder.worker_threads(w); }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "audit", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "audit",
        event = "start",
        %run_id,
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.runtime.worker_threads.unwrap_or_default(),
        "aggregate audit starting"
    );

    match rt.block_on(run(&cfg)) {
        Ok(report) if report.is_clean() => {
            info!(service = "audit", event = "clean", %run_id, users = report.users_checked, "no inconsistencies found");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for user_id in &report.users_without_profile {
                warn!(service = "audit", event = "finding", kind = "missing_profile", %user_id);
            }
            for d in &report.drifted {
                warn!(service = "audit", event = "finding", kind = "aggregate_drift", user_id = %d.user_id, stored = %d.stored, expected = %d.expected);
            }
            error!(service = "audit", event = "inconsistent", %run_id, findings = report.findings(), "inconsistencies found");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(service = "audit", event = "run_failed", %run_id, error = %e, "audit failed");
            ExitCode::FAILURE
        }
    }
}
