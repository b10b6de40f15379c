use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fully explicit per-call layout configuration.
///
/// The engine never falls back to defaults or ambient state; callers supply
/// every field on every call. `desktop_bounds` is the layout container in
/// the shared coordinate space of the display.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub desktop_bounds: Rect,
    /// Narrowest a rendered task tile may get, in pixels.
    pub min_task_width: i32,
    /// Upper bound on grid rows; also bounds how short tiles may get.
    pub max_rows: i32,
    pub padding: PaddingSettings,
    pub margins: MarginSettings,
}

impl LayoutConfig {
    /// The region tiles may occupy: the container inset by the margins.
    pub fn grid_area(&self) -> Rect {
        self.desktop_bounds.inset(
            self.margins.left,
            self.margins.top,
            self.margins.right,
            self.margins.bottom,
        )
    }
}

/// Spacing between tiles within the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaddingSettings {
    /// Horizontal gap between tiles in a row
    #[serde(default)]
    pub horizontal: i32,
    /// Vertical gap between rows
    #[serde(default)]
    pub vertical: i32,
}

/// Space between the grid and the container edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarginSettings {
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
}

/// File-facing grid settings for the surrounding shell.
///
/// Container bounds are a display property, not a setting, so this block
/// holds everything else and is adapted per call via [`to_layout_config`].
///
/// [`to_layout_config`]: GridSettings::to_layout_config
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    #[serde(default = "default_min_task_width")]
    pub min_task_width: i32,
    #[serde(default = "default_max_rows")]
    pub max_rows: i32,
    #[serde(default)]
    pub padding: PaddingSettings,
    #[serde(default)]
    pub margins: MarginSettings,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            min_task_width: default_min_task_width(),
            max_rows: default_max_rows(),
            padding: PaddingSettings::default(),
            margins: MarginSettings::default(),
        }
    }
}

fn default_min_task_width() -> i32 { 200 }

fn default_max_rows() -> i32 { 4 }

impl GridSettings {
    pub fn read(path: &Path) -> Result<GridSettings, SettingsError> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> Result<GridSettings, SettingsError> {
        Ok(toml::from_str(buf)?)
    }

    pub fn to_layout_config(&self, desktop_bounds: Rect) -> LayoutConfig {
        LayoutConfig {
            desktop_bounds,
            min_task_width: self.min_task_width,
            max_rows: self.max_rows,
            padding: self.padding,
            margins: self.margins,
        }
    }

    /// Validates the settings block and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.min_task_width <= 0 {
            issues.push(format!(
                "min_task_width must be positive, got {}",
                self.min_task_width
            ));
        }

        if self.max_rows < 1 {
            issues.push(format!("max_rows must be at least 1, got {}", self.max_rows));
        }

        if self.padding.horizontal < 0 {
            issues.push(format!(
                "padding.horizontal must be non-negative, got {}",
                self.padding.horizontal
            ));
        }

        if self.padding.vertical < 0 {
            issues.push(format!(
                "padding.vertical must be non-negative, got {}",
                self.padding.vertical
            ));
        }

        for (name, value) in [
            ("margins.left", self.margins.left),
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
        ] {
            if value < 0 {
                issues.push(format!("{} must be non-negative, got {}", name, value));
            }
        }

        issues
    }

    /// Attempts to fix settings values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.min_task_width <= 0 {
            self.min_task_width = default_min_task_width();
            fixes += 1;
        }

        if self.max_rows < 1 {
            self.max_rows = default_max_rows();
            fixes += 1;
        }

        if self.padding.horizontal < 0 {
            self.padding.horizontal = 0;
            fixes += 1;
        }

        if self.padding.vertical < 0 {
            self.padding.vertical = 0;
            fixes += 1;
        }

        for value in [
            &mut self.margins.left,
            &mut self.margins.top,
            &mut self.margins.right,
            &mut self.margins.bottom,
        ] {
            if *value < 0 {
                *value = 0;
                fixes += 1;
            }
        }

        fixes
    }
}
