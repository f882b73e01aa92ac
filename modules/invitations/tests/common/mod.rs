#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use invitations::api::AppState;
use invitations::contract::model::{Account, Delivery, EventDraft};
use invitations::domain::ports::{Notifier, RsvpNotice};
use invitations::domain::service::{Service, ServiceConfig};
use invitations::infra::auth::SessionStore;
use invitations::infra::preview::PreviewRenderer;
use invitations::infra::storage::SeaOrmRepository;
use invitations::Invitations;

pub const BASE_URL: &str = "http://invite.test";

/// Fresh in-memory database with migrations applied. A single pooled
/// connection keeps every query on the same in-memory file.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Invitations::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

/// Notifier that records every notice and answers with a fixed outcome.
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<RsvpNotice>>,
    outcome: Delivery,
}

impl RecordingNotifier {
    pub fn sending() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            outcome: Delivery::Sent,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            outcome: Delivery::Failed {
                reason: "connection refused".into(),
            },
        })
    }

    pub fn recorded(&self) -> Vec<RsvpNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_rsvp(&self, notice: &RsvpNotice) -> Delivery {
        self.notices.lock().unwrap().push(notice.clone());
        self.outcome.clone()
    }
}

pub async fn test_service(notifier: Arc<RecordingNotifier>) -> Arc<Service> {
    let db = test_db().await;
    let repo = SeaOrmRepository::new(db);
    let config = ServiceConfig {
        public_host: "invite.test".into(),
        ..ServiceConfig::default()
    };
    Arc::new(Service::new(Arc::new(repo), notifier, config))
}

pub fn test_state(service: Arc<Service>) -> AppState {
    AppState {
        service,
        sessions: SessionStore::new(Duration::from_secs(3600)),
        previews: PreviewRenderer::new(16),
        base_url: Arc::from(BASE_URL),
    }
}

pub fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.into(),
        description: "Cake, games and good company".into(),
        host: "Maya".into(),
        starts_at: "2025-10-04T11:00".into(),
        location: "Community Hall".into(),
        ..EventDraft::default()
    }
}

/// Registers the first (admin) account and one event it owns.
pub async fn admin_with_event(service: &Service) -> (Account, invitations::model::Event) {
    let admin = service
        .register("Maya", "maya@example.com", "hunter2")
        .await
        .expect("register admin");
    let event = service
        .create_event(&admin, draft("Garden Party"))
        .await
        .expect("create event");
    (admin, event)
}
