use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Knobs owned by the host; the engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// When false every encounter runs in Normal mode.
    pub hard_mode: bool,
    /// ISO weekday (1 = Monday) → additive bonus, e.g. 0.5 for +50%.
    pub daily_bonus: BTreeMap<u8, f64>,
    /// Pay currency in the adventure currency rather than bank credits.
    pub separate_currency: bool,
    /// Percentage of the balance a rebirth costs.
    pub rebirth_cost_pct: f64,
    /// Closed encounters remembered for monster scaling.
    pub history_len: usize,
    /// Length of the action window in milliseconds.
    pub window_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hard_mode: false,
            daily_bonus: BTreeMap::new(),
            separate_currency: false,
            rebirth_cost_pct: 100.0,
            history_len: 5,
            window_ms: 120_000,
        }
    }
}

impl EngineConfig {
    pub fn day_bonus(&self, weekday: u8) -> f64 {
        self.daily_bonus.get(&weekday).copied().unwrap_or(0.0)
    }

    /// Load from `.json`, `.yaml` or `.yml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config JSON: {}", path.display())),
            Some("yaml" | "yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config YAML: {}", path.display())),
            other => bail!("unsupported config format {:?}: {}", other, path.display()),
        }
    }
}
