use tracing::{info, warn};

use super::data::{CopyOutcome, CopyRequest};
use super::panorama::PanoramaMap;
use super::site::Site;

/// Copy every pair in order. Each copy stands alone: a failure is
/// recorded and the loop moves on, nothing already copied is undone.
pub async fn copy_batch(site: &Site, requests: &[CopyRequest]) -> Vec<CopyOutcome> {
    let mut outcomes = Vec::with_capacity(requests.len());

    for request in requests {
        match site.copy_into(&request.source, &request.target).await {
            Ok(()) => outcomes.push(CopyOutcome::succeeded(request)),
            Err(e) => {
                warn!("⚠️  {}", e);
                outcomes.push(CopyOutcome::failed(request, e.to_string()));
            }
        }
    }

    outcomes
}

/// What a commit did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub copies: Vec<CopyOutcome>,
    /// None if the panorama map had no changes to write
    pub panorama: Option<Result<(), String>>,
}

impl CommitReport {
    pub fn success_count(&self) -> usize {
        self.copies.iter().filter(|o| o.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.copies.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0 && !matches!(self.panorama, Some(Err(_)))
    }
}

/// Copy pending files and persist panorama changes.
///
/// Takes ownership of the panorama map and hands it back, so the caller
/// keeps the updated dirty state regardless of how the write went.
pub async fn commit(
    site: Site,
    requests: Vec<CopyRequest>,
    mut panorama: PanoramaMap,
) -> (CommitReport, PanoramaMap) {
    info!("🚀 Committing {} files", requests.len());
    let copies = copy_batch(&site, &requests).await;

    let panorama_result = if panorama.is_dirty() {
        Some(panorama.commit(&site).await.map_err(|e| {
            warn!("⚠️  Panorama save failed: {}", e);
            e.to_string()
        }))
    } else {
        None
    };

    let report = CommitReport { copies, panorama: panorama_result };
    info!(
        "✅ Commit done: {} copied, {} failed",
        report.success_count(),
        report.failure_count()
    );
    (report, panorama)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sources(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("src{}.png", i));
                std::fs::write(&path, format!("file {}", i)).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path().join("site"));
        let mut srcs = sources(dir.path(), 4);
        // Pair 2 points at a file that doesn't exist
        srcs[2] = dir.path().join("missing.png");

        let requests: Vec<CopyRequest> = srcs
            .into_iter()
            .enumerate()
            .map(|(i, source)| CopyRequest { source, target: format!("images/{}.png", i) })
            .collect();

        let outcomes = copy_batch(&site, &requests).await;

        assert_eq!(outcomes.len(), 4);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.target_path, format!("images/{}.png", i));
            assert_eq!(outcome.success, i != 2, "pair {}", i);
        }
        assert!(outcomes[2].error.as_deref().unwrap().contains("missing.png"));
        assert!(site.exists("images/3.png").await);
        assert!(!site.exists("images/2.png").await);
    }

    #[tokio::test]
    async fn test_commit_writes_dirty_panorama_only() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        let srcs = sources(dir.path(), 1);
        let requests = vec![CopyRequest { source: srcs[0].clone(), target: "images/a.png".to_string() }];

        let (report, panorama) = commit(site.clone(), requests, PanoramaMap::default()).await;
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.panorama, None);
        assert!(report.all_succeeded());
        assert!(!panorama.is_dirty());
        assert!(!site.exists("data/panoramic-embeds.json").await);

        let mut panorama = panorama;
        panorama.set("service-panoramic-1", "https://tour");
        let (report, panorama) = commit(site.clone(), Vec::new(), panorama).await;
        assert_eq!(report.panorama, Some(Ok(())));
        assert!(report.copies.is_empty());
        assert!(!panorama.is_dirty());
        assert_eq!(PanoramaMap::load(&site).await.get("service-panoramic-1"), "https://tour");
    }
}
