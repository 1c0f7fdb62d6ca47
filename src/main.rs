use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use recipebox::auth::{policy, register, RegistrationRequest};
use recipebox::clock::{Clock, SystemClock};
use recipebox::storage::ImageStorage;
use recipebox::web::{AppState, WebServer};
use recipebox::{Config, Database, Role, UserRepository};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = recipebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        recipebox::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("RecipeBox - recipe sharing service");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> recipebox::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    ensure_bootstrap_admin(&db, &config, clock.as_ref()).await?;

    let images = ImageStorage::new(
        &config.uploads.storage_path,
        &config.uploads.public_prefix,
        config.uploads.max_upload_size_mb.saturating_mul(1024 * 1024),
    )?;

    let state = Arc::new(AppState::new(db, &config, images, clock));
    let server = WebServer::new(&config.server, state)?;
    server.run().await?;
    Ok(())
}

/// Create the configured super_admin account if it does not exist yet.
async fn ensure_bootstrap_admin(
    db: &Database,
    config: &Config,
    clock: &dyn Clock,
) -> recipebox::Result<()> {
    let (Some(username), Some(password)) = (
        config.bootstrap.admin_username.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if let Some(existing) = UserRepository::new(db.pool()).get_by_username(username).await? {
        if !policy::is_super_admin(&existing) {
            warn!(
                username = %username,
                role = %existing.role,
                "Bootstrap account exists without super_admin role; leaving it unchanged"
            );
        }
        return Ok(());
    }

    let request = RegistrationRequest::new(username, password).with_role(Role::SuperAdmin);
    register(db.pool(), request, clock.now()).await?;
    info!(username = %username, "Bootstrap super_admin created");
    Ok(())
}
