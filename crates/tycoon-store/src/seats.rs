//! Scanned seat configuration tables

use std::path::{Path, PathBuf};
use tracing::debug;
use tycoon_core::{Aircraft, Result, TycoonError, WaveStat};

/// Seat configurations stored as
/// `<root>/seat/<hub>_<destination>_<maker>_<model>.csv`
#[derive(Debug, Clone)]
pub struct SeatConfigStore {
    root: PathBuf,
}

fn csv_error(path: &Path, e: csv::Error) -> TycoonError {
    TycoonError::Csv(format!("{}: {}", path.display(), e))
}

impl SeatConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, hub: &str, destination: &str, aircraft: &Aircraft) -> PathBuf {
        self.root.join("seat").join(format!(
            "{}_{}_{}_{}.csv",
            hub, destination, aircraft.maker, aircraft.model
        ))
    }

    pub fn exists(&self, hub: &str, destination: &str, aircraft: &Aircraft) -> bool {
        self.path(hub, destination, aircraft).exists()
    }

    /// Write the scanned waves in scan order, replacing any earlier table
    ///
    /// An empty scan is refused so it never shadows a later rescan.
    pub fn save(
        &self,
        hub: &str,
        destination: &str,
        aircraft: &Aircraft,
        waves: &[WaveStat],
    ) -> Result<PathBuf> {
        let path = self.path(hub, destination, aircraft);
        if waves.is_empty() {
            return Err(TycoonError::NotFound(format!(
                "no seat configurations to store for {} - {} ({})",
                hub, destination, aircraft
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_error(&path, e))?;
        for wave in waves {
            writer.serialize(wave).map_err(|e| csv_error(&path, e))?;
        }
        writer.flush()?;

        debug!(
            "Stored {} seat configuration(s) for {} - {} ({}) to {:?}",
            waves.len(),
            hub,
            destination,
            aircraft,
            path
        );
        Ok(path)
    }

    pub fn load(&self, hub: &str, destination: &str, aircraft: &Aircraft) -> Result<Vec<WaveStat>> {
        self.load_cached(hub, destination, aircraft)?.ok_or_else(|| {
            TycoonError::NotFound(format!(
                "no seat configurations for {} - {} ({}) at {}",
                hub,
                destination,
                aircraft,
                self.path(hub, destination, aircraft).display()
            ))
        })
    }

    /// Cached waves, or `None` when this combination was never scanned or
    /// its table holds no rows
    pub fn load_cached(
        &self,
        hub: &str,
        destination: &str,
        aircraft: &Aircraft,
    ) -> Result<Option<Vec<WaveStat>>> {
        let path = self.path(hub, destination, aircraft);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| csv_error(&path, e))?;
        let waves = reader
            .deserialize()
            .collect::<std::result::Result<Vec<WaveStat>, _>>()
            .map_err(|e| csv_error(&path, e))?;
        if waves.is_empty() {
            debug!("Ignoring empty seat table {:?}", path);
            return Ok(None);
        }
        Ok(Some(waves))
    }
}
