use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::{self, AppState};
use crate::config::InvitationsConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::auth::SessionStore;
use crate::infra::mail::build_notifier;
use crate::infra::preview::PreviewRenderer;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmRepository;

/// The invitations module: owns the shared state behind every route.
#[derive(Clone)]
pub struct Invitations {
    state: AppState,
}

impl Invitations {
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running invitations database migrations");
        Migrator::up(db, None).await?;
        info!("Invitations database migrations completed successfully");
        Ok(())
    }

    /// Migrate, wire the service and seed the welcome event if needed.
    pub async fn init(db: DatabaseConnection, cfg: &InvitationsConfig) -> anyhow::Result<Self> {
        info!("Initializing invitations module");
        cfg.validate()?;
        Self::migrate(&db).await?;

        let notifier = build_notifier(cfg);
        let service_config = ServiceConfig {
            public_host: cfg.public_host(),
            ..ServiceConfig::default()
        };
        debug!(?service_config, "invitations service config");
        let repo = SeaOrmRepository::new(db);
        let service = Arc::new(Service::new(Arc::new(repo), notifier, service_config));

        if cfg.seed_default_event {
            service.seed_default_event().await?;
        }

        let state = AppState {
            service,
            sessions: SessionStore::new(Duration::from_secs(cfg.session_ttl_hours * 3600)),
            previews: PreviewRenderer::new(cfg.preview_cache_capacity),
            base_url: Arc::from(cfg.base_url.trim_end_matches('/')),
        };
        Ok(Self { state })
    }

    pub fn register_rest(&self, static_dir: &Path) -> axum::Router {
        info!(static_dir = %static_dir.display(), "Registering invitations routes");
        api::router(self.state.clone(), static_dir)
    }
}
