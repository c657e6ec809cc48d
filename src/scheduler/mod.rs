//! Periodic refresh of the published playlist.
//!
//! The scheduler runs one refresh cycle immediately at startup and then one
//! per configured interval. A cycle fetches the upstream playlist, filters it
//! against the allow list, and overwrites the published file in place. Failed
//! cycles are logged and leave the previously published file untouched.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::errors::AppResult;
use crate::filter::{filter_playlist, AllowList};
use crate::source::PlaylistFetcher;

pub struct RefreshScheduler {
    fetcher: Arc<dyn PlaylistFetcher>,
    allow_list: Arc<AllowList>,
    storage: StorageConfig,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        fetcher: Arc<dyn PlaylistFetcher>,
        allow_list: Arc<AllowList>,
        storage: StorageConfig,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            allow_list,
            storage,
            interval,
        }
    }

    /// Run refresh cycles until the cancellation token fires.
    pub async fn run(&self, cancellation_token: CancellationToken) {
        info!(
            "Starting refresh scheduler (interval: {})",
            humantime::format_duration(self.interval)
        );
        let mut ticker = interval(self.interval);

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    info!("Refresh scheduler received cancellation signal, shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.refresh_once().await {
                        Ok(path) => debug!("Refresh cycle complete: {}", path.display()),
                        Err(e) => error!("Refresh cycle failed: {e}"),
                    }
                }
            }
        }

        info!("Refresh scheduler stopped");
    }

    /// Fetch, filter, and publish one playlist snapshot.
    pub async fn refresh_once(&self) -> AppResult<PathBuf> {
        let raw = self.fetcher.fetch().await?;
        let filtered = filter_playlist(&raw, &self.allow_list);
        let channels = filtered
            .lines()
            .filter(|line| line.starts_with(crate::filter::EXTINF_PREFIX))
            .count();

        let path = self.write_output(&filtered).await?;
        info!("Published {channels} channels to {}", path.display());
        Ok(path)
    }

    async fn write_output(&self, content: &str) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.storage.output_dir).await?;
        let path = self.storage.output_path();
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use async_trait::async_trait;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl PlaylistFetcher for StaticFetcher {
        async fn fetch(&self) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PlaylistFetcher for FailingFetcher {
        async fn fetch(&self) -> Result<String, FetchError> {
            Err(FetchError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                url: "http://upstream.invalid/list.m3u".to_string(),
            })
        }
    }

    const UPSTREAM: &str = "#EXTM3U\n\
        #EXTINF:-1 tvg-id=\"RTP1.pt\",RTP 1\n\
        http://upstream.invalid/rtp1\n\
        #EXTINF:-1 tvg-id=\"Other.tv\",Other\n\
        http://upstream.invalid/other\n";

    fn scheduler_with(
        fetcher: Arc<dyn PlaylistFetcher>,
        dir: &std::path::Path,
    ) -> RefreshScheduler {
        let storage = StorageConfig {
            output_dir: dir.to_path_buf(),
            output_filename: "filtered.m3u".to_string(),
        };
        RefreshScheduler::new(
            fetcher,
            Arc::new(AllowList::new(["RTP1.pt"])),
            storage,
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn refresh_publishes_filtered_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_with(Arc::new(StaticFetcher(UPSTREAM)), dir.path());

        let path = scheduler.refresh_once().await.unwrap();

        let published = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            published,
            "#EXTM3U\n#EXTINF:-1 tvg-id=\"RTP1.pt\",RTP 1\nhttp://upstream.invalid/rtp1"
        );
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_with(Arc::new(StaticFetcher(UPSTREAM)), dir.path());
        let path = scheduler.refresh_once().await.unwrap();
        let before = tokio::fs::read_to_string(&path).await.unwrap();

        let failing = scheduler_with(Arc::new(FailingFetcher), dir.path());
        assert!(failing.refresh_once().await.is_err());

        let after = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn run_exits_promptly_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_with(Arc::new(StaticFetcher(UPSTREAM)), dir.path());

        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), scheduler.run(token))
            .await
            .expect("scheduler should stop once cancelled");

        // Cancellation won before the first cycle, so nothing was published.
        assert!(!dir.path().join("filtered.m3u").exists());
    }
}
