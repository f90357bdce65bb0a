//! Per-route statistics documents

use std::path::{Path, PathBuf};
use tracing::debug;
use tycoon_core::{Result, RouteStats, TycoonError};

/// Route statistics stored as `<root>/<hub>/<destination>.json`
#[derive(Debug, Clone)]
pub struct RouteStore {
    root: PathBuf,
}

impl RouteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cached document for a route
    pub fn path(&self, hub: &str, route: &str) -> PathBuf {
        self.root.join(hub).join(format!("{}.json", route))
    }

    /// Whether a previous run already extracted this route
    pub fn exists(&self, hub: &str, route: &str) -> bool {
        self.path(hub, route).exists()
    }

    /// Write a route's statistics, replacing any earlier extraction
    pub fn save(&self, hub: &str, route: &str, stats: &RouteStats) -> Result<PathBuf> {
        let path = self.path(hub, route);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(stats)?)?;
        debug!("Stored route stats for {} - {} to {:?}", hub, route, path);
        Ok(path)
    }

    pub fn load(&self, hub: &str, route: &str) -> Result<RouteStats> {
        let path = self.path(hub, route);
        if !path.exists() {
            return Err(TycoonError::NotFound(format!(
                "no stats for {} - {} at {}",
                hub,
                route,
                path.display()
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Destinations with cached statistics for a hub, sorted
    pub fn cached_routes(&self, hub: &str) -> Result<Vec<String>> {
        let dir = self.root.join(hub);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut routes = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                routes.push(stem.to_string());
            }
        }
        routes.sort();
        Ok(routes)
    }
}
