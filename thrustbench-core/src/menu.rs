//! Test selection menu
//!
//! Owns the preset test configurations and the current selection. Select
//! edges cycle through the presets while the stand is Ready.

use heapless::Vec;

use crate::config::{ConfigError, TestConfig};

/// Maximum presets held by the menu
pub const MAX_PRESETS: usize = 8;

/// Preset test configurations
pub const DEFAULT_PRESETS: [TestConfig; 2] = [
    TestConfig::ramp_map(1100, 1900, 50),
    TestConfig::constant_thrust(500.0, 1200),
];

#[derive(Debug, Clone)]
pub struct TestMenu {
    presets: Vec<TestConfig, MAX_PRESETS>,
    selected: usize,
}

impl Default for TestMenu {
    fn default() -> Self {
        let mut presets = Vec::new();
        for preset in DEFAULT_PRESETS {
            // DEFAULT_PRESETS is shorter than MAX_PRESETS
            let _ = presets.push(preset);
        }
        Self {
            presets,
            selected: 0,
        }
    }
}

impl TestMenu {
    /// Menu with the default presets
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected configuration
    pub fn selected(&self) -> &TestConfig {
        &self.presets[self.selected]
    }

    /// Index of the selection
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Move the selection to the next preset, wrapping around
    pub fn select_next(&mut self) -> &TestConfig {
        self.selected = (self.selected + 1) % self.presets.len();
        self.selected()
    }

    /// All presets
    pub fn presets(&self) -> &[TestConfig] {
        &self.presets
    }

    /// Replace the presets
    ///
    /// Presets are validated when a run starts, not here. On error the
    /// menu is left unchanged.
    pub fn replace(&mut self, presets: &[TestConfig]) -> Result<(), ConfigError> {
        if presets.is_empty() {
            return Err(ConfigError::NoPresets);
        }
        self.presets = Vec::from_slice(presets).map_err(|_| ConfigError::TooManyPresets)?;
        self.selected = 0;
        Ok(())
    }
}
