// =============================================================================
// Application State — Pulse indicator service
// =============================================================================
//
// The engine itself is stateless; the only shared state in the service is the
// runtime configuration and a few counters for the health endpoint.
//
// Thread safety:
//   - Atomic counter for lock-free request accounting.
//   - parking_lot::RwLock for the configuration. Guards are never held across
//     an await point.
//   - `save_lock` serialises "change config, write file" so the file on disk
//     always matches the last change applied in memory.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::runtime_config::{EngineConfig, IndicatorSettings};

/// Shared state handed to every request handler via `Arc<AppState>`.
pub struct AppState {
    pub config: RwLock<EngineConfig>,

    /// Where settings changes are persisted.
    pub config_path: PathBuf,

    /// Held from a config change until its save completes.
    pub save_lock: Mutex<()>,

    /// Number of indicator requests answered since start-up.
    pub requests_served: AtomicU64,

    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: EngineConfig, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config: RwLock::new(config),
            config_path: config_path.into(),
            save_lock: Mutex::new(()),
            requests_served: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Snapshot of the current indicator settings.
    pub fn settings(&self) -> IndicatorSettings {
        self.config.read().settings.clone()
    }

    /// Write the current config to `config_path`, ordered after any
    /// settings change still being saved.
    pub fn save_config(&self) -> anyhow::Result<()> {
        let _guard = self.save_lock.lock();
        let snapshot = self.config.read().clone();
        snapshot.save(&self.config_path)
    }

    pub fn max_batch_size(&self) -> usize {
        self.config.read().max_batch_size
    }

    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_counter_increments() {
        let state = AppState::new(EngineConfig::default(), "unused.json");
        assert_eq!(state.requests_served(), 0);
        assert_eq!(state.record_request(), 1);
        assert_eq!(state.record_request(), 2);
        assert_eq!(state.requests_served(), 2);
    }

    #[test]
    fn save_config_writes_current_settings() {
        let path = std::env::temp_dir().join(format!("pulse-state-{}.json", std::process::id()));
        let state = AppState::new(EngineConfig::default(), path.clone());
        state.config.write().settings.bollinger_period = 30;
        state.save_config().unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.settings.bollinger_period, 30);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn settings_snapshot_is_detached() {
        let state = AppState::new(EngineConfig::default(), "unused.json");
        let before = state.settings();
        state.config.write().settings.rsi_period = 7;
        assert_eq!(before.rsi_period, 14);
        assert_eq!(state.settings().rsi_period, 7);
    }
}
