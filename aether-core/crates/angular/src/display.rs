//! Monotone EMA display projection (§4.8): per-patch `display` only ever
//! grows, even when the underlying `target` value drops — the capture UI
//! never regresses a patch's displayed confidence.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayEntry {
    pub ema: f64,
    pub display: f64,
    pub is_locked: bool,
    pub last_ts_ms: u64,
}

impl DisplayEntry {
    fn new() -> Self {
        DisplayEntry {
            ema: 0.0,
            display: 0.0,
            is_locked: false,
            last_ts_ms: 0,
        }
    }
}

/// Tracks a [`DisplayEntry`] per patch. `alpha_locked`/`alpha_unlocked`
/// are the EMA decay rates for locked vs. unlocked patches; both must be
/// in `(0, 1]`.
pub struct DisplayMap {
    alpha_locked: f64,
    alpha_unlocked: f64,
    entries: BTreeMap<String, DisplayEntry>,
}

impl DisplayMap {
    pub fn new(alpha_locked: f64, alpha_unlocked: f64) -> Self {
        assert!(
            alpha_locked > 0.0 && alpha_locked <= 1.0,
            "alpha_locked must be in (0, 1]"
        );
        assert!(
            alpha_unlocked > 0.0 && alpha_unlocked <= 1.0,
            "alpha_unlocked must be in (0, 1]"
        );
        DisplayMap {
            alpha_locked,
            alpha_unlocked,
            entries: BTreeMap::new(),
        }
    }

    /// Updates the patch's EMA toward `target` and folds the result into
    /// the monotone `display` value. Returns the updated entry.
    pub fn update(
        &mut self,
        patch_id: &str,
        target: f64,
        is_locked: bool,
        ts_ms: u64,
    ) -> DisplayEntry {
        let alpha = if is_locked {
            self.alpha_locked
        } else {
            self.alpha_unlocked
        };

        let entry = self
            .entries
            .entry(patch_id.to_string())
            .or_insert_with(DisplayEntry::new);

        let target = target.clamp(0.0, 1.0);
        entry.ema = alpha * target + (1.0 - alpha) * entry.ema;
        entry.display = entry.display.max(entry.ema).clamp(0.0, 1.0);
        entry.is_locked = is_locked;
        entry.last_ts_ms = ts_ms;
        *entry
    }

    pub fn get(&self, patch_id: &str) -> Option<DisplayEntry> {
        self.entries.get(patch_id).copied()
    }

    /// `color_evidence = clamp01(0.7 * display + 0.3 * global_display)`.
    pub fn color_evidence(&self, patch_id: &str, global_display: f64) -> Option<f64> {
        self.entries
            .get(patch_id)
            .map(|entry| (0.7 * entry.display + 0.3 * global_display).clamp(0.0, 1.0))
    }

    /// All entries sorted by `patch_id` in lexicographic order, for
    /// deterministic output regardless of update history.
    pub fn snapshot_sorted(&self) -> Vec<(String, DisplayEntry)> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), *entry))
            .collect()
    }
}
