use std::sync::Arc;

use crate::auth::repo::UserRepo;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::mail::{Mailer, SmtpMailer};
use crate::progress::repo::ProgressRepo;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub progress: Arc<dyn ProgressRepo>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = PgStore::connect(&config.database_url).await?;
        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }
        let store = Arc::new(store);

        let mailer = Arc::new(SmtpMailer::new(&config.smtp)?) as Arc<dyn Mailer>;

        Ok(Self {
            config,
            users: store.clone() as Arc<dyn UserRepo>,
            progress: store as Arc<dyn ProgressRepo>,
            mailer,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn now(&self) -> time::OffsetDateTime {
        self.clock.now()
    }
}
