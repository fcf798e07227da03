//! Fan-out of one collection cycle across every enabled collector.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use sqlx::SqlitePool;

use sweep_collectors::{
    CollectRequest, Collector, FacebookCollector, ForumCollector, RedditCollector,
    TwitterCollector,
};
use sweep_core::{AppConfig, PlatformsConfig, PostRecord};
use sweep_store::upsert_ignore;

use crate::AgentError;

/// Outcome of one collection cycle.
#[derive(Debug)]
pub struct CollectionSummary {
    /// Records per platform, as returned by the collectors. A platform whose
    /// collector failed is present with an empty list.
    pub collected: HashMap<String, Vec<PostRecord>>,
    /// Rows newly written to the store; duplicates of earlier sweeps are
    /// not counted.
    pub inserted: u64,
}

impl CollectionSummary {
    #[must_use]
    pub fn total_collected(&self) -> usize {
        self.collected.values().map(Vec::len).sum()
    }
}

/// Owns the enabled collectors and the storage pool.
pub struct Coordinator {
    collectors: Vec<Arc<dyn Collector>>,
    pool: SqlitePool,
}

impl Coordinator {
    #[must_use]
    pub fn new(collectors: Vec<Arc<dyn Collector>>, pool: SqlitePool) -> Self {
        Self { collectors, pool }
    }

    /// Build collectors for every platform enabled in `platforms`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Collector`] if an HTTP client cannot be built.
    pub fn from_config(
        platforms: &PlatformsConfig,
        app: &AppConfig,
        pool: SqlitePool,
    ) -> Result<Self, AgentError> {
        let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();

        if platforms.forums.enabled {
            collectors.push(Arc::new(ForumCollector::new(
                platforms.forums.clone(),
                app.http_timeout_secs,
                &app.user_agent,
            )?));
        }
        if platforms.reddit.enabled {
            collectors.push(Arc::new(RedditCollector::new(
                platforms.reddit.clone(),
                app.http_timeout_secs,
            )?));
        }
        if platforms.twitter.enabled {
            collectors.push(Arc::new(TwitterCollector::new(
                platforms.twitter.clone(),
                app.http_timeout_secs,
                &app.user_agent,
            )?));
        }
        if platforms.facebook.enabled {
            collectors.push(Arc::new(FacebookCollector::new(
                platforms.facebook.clone(),
                app.http_timeout_secs,
                &app.user_agent,
            )?));
        }

        tracing::info!(
            platforms = ?collectors.iter().map(|c| c.platform()).collect::<Vec<_>>(),
            "coordinator ready"
        );
        Ok(Self::new(collectors, pool))
    }

    /// Platform tags of the enabled collectors.
    #[must_use]
    pub fn platforms(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.platform()).collect()
    }

    /// Run one collection cycle.
    ///
    /// `platforms` of `None` sweeps every enabled collector; an explicit list
    /// restricts the cycle to those platforms, and names with no enabled
    /// collector are skipped with a warning. Collectors run concurrently; a
    /// collector failure is logged and yields an empty list for its platform
    /// rather than failing the cycle. Everything collected is persisted
    /// before the summary is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Store`] if persisting fails.
    pub async fn collect_data(
        &self,
        platforms: Option<&[String]>,
        request: &CollectRequest,
    ) -> Result<CollectionSummary, AgentError> {
        let selected: Vec<&Arc<dyn Collector>> = self
            .collectors
            .iter()
            .filter(|c| match platforms {
                Some(wanted) => wanted.iter().any(|p| p == c.platform()),
                None => true,
            })
            .collect();
        if let Some(wanted) = platforms {
            for name in wanted {
                if !selected.iter().any(|c| c.platform() == name) {
                    tracing::warn!(platform = %name, "no enabled collector for platform, skipping");
                }
            }
        }

        let cycles = selected.iter().map(|collector| async move {
            let records = match collector.collect(request).await {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(
                        platform = collector.platform(),
                        error = %err,
                        "collector failed, continuing with the rest"
                    );
                    Vec::new()
                }
            };
            (collector.platform().to_string(), records)
        });

        let collected: HashMap<String, Vec<PostRecord>> = join_all(cycles).await.into_iter().collect();

        let all: Vec<PostRecord> = collected.values().flatten().cloned().collect();
        let inserted = upsert_ignore(&self.pool, &all).await?;

        tracing::info!(
            collected = all.len(),
            inserted,
            "collection cycle complete"
        );
        Ok(CollectionSummary { collected, inserted })
    }
}
