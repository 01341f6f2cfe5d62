//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::SqliteService;
use crate::data::sqlite::repositories;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: SystemCommands::Prune { yes },
            }) => return Self::prune_data(yes),
            Some(Commands::System {
                command: system_cmd,
            }) => {
                let app = Self::init(&cli_config).await?;
                let result = app.handle_system_command(system_cmd).await;
                app.database.close().await;
                return result;
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;
        Self::with_storage(config, storage).await
    }

    /// Open the database inside an initialized storage directory
    pub async fn with_storage(config: AppConfig, storage: AppStorage) -> Result<Self> {
        let database = SqliteService::init(&storage)
            .await
            .context("Failed to initialize database")?;
        let database = Arc::new(database);
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
        })
    }

    async fn handle_system_command(&self, cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Seed => {
                let inserted = repositories::seed_defaults(self.database.pool())
                    .await
                    .context("Failed to seed lookup tables")?;
                println!("Seeded {} categories and statuses.", inserted);
                Ok(())
            }
            SystemCommands::InitTemplate { force } => self.init_template(force),
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    #[cfg(any(feature = "word", feature = "pdf"))]
    fn init_template(&self, force: bool) -> Result<()> {
        let path = self.storage.template_path(&self.config.reports);

        if path.exists() && !force {
            println!(
                "Template already exists: {}\nUse --force to overwrite it.",
                path.display()
            );
            return Ok(());
        }

        crate::domain::reports::export::docx::write_scaffold(
            &path,
            &self.config.reports.organization,
        )
        .with_context(|| format!("Failed to write template: {}", path.display()))?;
        println!("Template written: {}", path.display());
        Ok(())
    }

    #[cfg(not(any(feature = "word", feature = "pdf")))]
    fn init_template(&self, _force: bool) -> Result<()> {
        anyhow::bail!("This build has no Word or PDF export support")
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging(debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("info,{}={}", APP_NAME_LOWER, level);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.shutdown
            .register(
                app.database
                    .start_checkpoint_task(app.shutdown.subscribe()),
            )
            .await;

        let template_path = app.storage.template_path(&app.config.reports);
        if !template_path.exists() {
            tracing::warn!(
                path = %template_path.display(),
                "Report template not found; Word exports will fall back to CSV. \
                 Run `weims system init-template` to create one."
            );
        }

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.config.auth.enabled,
            &app.storage.data_dir().display().to_string(),
            &template_path.display().to_string(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AuthConfig, ReportsConfig, ServerConfig};

    async fn test_app(dir: &std::path::Path) -> CoreApp {
        let storage = AppStorage::init_at(dir).await.unwrap();
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5390,
            },
            auth: AuthConfig { enabled: true },
            reports: ReportsConfig::default(),
            debug: false,
        };
        CoreApp::with_storage(config, storage).await.unwrap()
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        app.handle_system_command(SystemCommands::Seed).await.unwrap();
        app.handle_system_command(SystemCommands::Seed).await.unwrap();

        let categories = repositories::list_categories(app.database.pool())
            .await
            .unwrap();
        assert_eq!(categories.len(), 18);
        let statuses = repositories::list_statuses(app.database.pool())
            .await
            .unwrap();
        assert_eq!(statuses.len(), 5);
    }

    #[cfg(any(feature = "word", feature = "pdf"))]
    #[tokio::test]
    async fn test_init_template_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;
        let path = app.storage.template_path(&app.config.reports);

        app.handle_system_command(SystemCommands::InitTemplate { force: false })
            .await
            .unwrap();
        assert!(path.is_file());

        std::fs::write(&path, b"custom").unwrap();
        app.handle_system_command(SystemCommands::InitTemplate { force: false })
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"custom");

        app.handle_system_command(SystemCommands::InitTemplate { force: true })
            .await
            .unwrap();
        assert_ne!(std::fs::read(&path).unwrap(), b"custom");
    }
}
