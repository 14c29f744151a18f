use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::context::local_store::{
    LocalStore, StoreError, KEY_SELECTED_FESTIVAL, KEY_SELECTED_YEAR,
};
use crate::db::festival_repository::FestivalRepository;
use crate::models::festival::Festival;

pub fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Debug)]
struct FestivalState {
    selected: Option<Festival>,
    year: i32,
}

/// Which festival and which calendar year the dashboards are filtered by.
/// The two are independent.
pub struct FestivalContext {
    repo: Arc<dyn FestivalRepository>,
    store: Arc<dyn LocalStore>,
    state: RwLock<FestivalState>,
}

impl FestivalContext {
    pub fn new(repo: Arc<dyn FestivalRepository>, store: Arc<dyn LocalStore>) -> Self {
        let selected = store
            .get(KEY_SELECTED_FESTIVAL)
            .and_then(|raw| match serde_json::from_str::<Festival>(&raw) {
                Ok(festival) => Some(festival),
                Err(err) => {
                    warn!(%err, "ignoring unreadable persisted festival");
                    None
                }
            });
        let year = store
            .get(KEY_SELECTED_YEAR)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(current_year);
        Self {
            repo,
            store,
            state: RwLock::new(FestivalState { selected, year }),
        }
    }

    /// Fills in the id of a persisted festival that was cached without one.
    /// Only an unambiguous match replaces the cached record; otherwise it is
    /// kept as is and id-scoped queries come back empty until the user picks
    /// a festival again.
    pub async fn initialize(&self) -> Result<Option<Festival>, StoreError> {
        let Some(cached) = self.selected_festival().await else {
            return Ok(None);
        };
        if cached.is_complete() {
            return Ok(Some(cached));
        }

        let matches = match self
            .repo
            .find_by_name_and_year(cached.organization_id, &cached.name, cached.year)
            .await
        {
            Ok(matches) => matches,
            Err(err) => {
                warn!(festival = %cached.label(), %err, "festival backfill lookup failed");
                return Ok(Some(cached));
            }
        };

        match <[Festival; 1]>::try_from(matches) {
            Ok([full]) => {
                info!(festival = %full.label(), "backfilled festival id");
                self.set_selected_festival(full.clone()).await?;
                Ok(Some(full))
            }
            Err(matches) => {
                warn!(
                    festival = %cached.label(),
                    matches = matches.len(),
                    "festival backfill found no unique match, keeping cached record"
                );
                Ok(Some(cached))
            }
        }
    }

    pub async fn selected_festival(&self) -> Option<Festival> {
        self.state.read().await.selected.clone()
    }

    pub async fn selected_year(&self) -> i32 {
        self.state.read().await.year
    }

    pub async fn set_selected_festival(&self, festival: Festival) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store
            .set(KEY_SELECTED_FESTIVAL, &serde_json::to_string(&festival)?)?;
        state.selected = Some(festival);
        Ok(())
    }

    pub async fn clear_selection(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store.remove(KEY_SELECTED_FESTIVAL)?;
        state.selected = None;
        Ok(())
    }

    pub async fn set_selected_year(&self, year: i32) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store.set(KEY_SELECTED_YEAR, &year.to_string())?;
        state.year = year;
        Ok(())
    }
}
