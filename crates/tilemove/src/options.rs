use serde::{Deserialize, Serialize};

/// Switches for each accelerated path. Read once when a map is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntilagOptions {
    pub flat_passages: bool,
    pub flat_bushes: bool,
    pub flat_counters: bool,
    pub indexed_occupants: bool,
    pub incremental_sprites: bool,
    pub cull_offscreen: bool,
}

/// Every accelerated path on. `all(false)` gives the plain layered lookups
/// with a full occupant scan and full sprite pushes.
impl Default for AntilagOptions {
    fn default() -> Self {
        Self::all(true)
    }
}

impl AntilagOptions {
    pub const FLAG_NAMES: [&'static str; 6] = [
        "flat_passages",
        "flat_bushes",
        "flat_counters",
        "indexed_occupants",
        "incremental_sprites",
        "cull_offscreen",
    ];

    pub const fn all(enabled: bool) -> Self {
        Self {
            flat_passages: enabled,
            flat_bushes: enabled,
            flat_counters: enabled,
            indexed_occupants: enabled,
            incremental_sprites: enabled,
            cull_offscreen: enabled,
        }
    }

    /// Returns `false` when `name` is not a known flag.
    pub fn set_flag(&mut self, name: &str, enabled: bool) -> bool {
        let slot = match name {
            "flat_passages" => &mut self.flat_passages,
            "flat_bushes" => &mut self.flat_bushes,
            "flat_counters" => &mut self.flat_counters,
            "indexed_occupants" => &mut self.indexed_occupants,
            "incremental_sprites" => &mut self.incremental_sprites,
            "cull_offscreen" => &mut self.cull_offscreen,
            _ => return false,
        };
        *slot = enabled;
        true
    }
}
