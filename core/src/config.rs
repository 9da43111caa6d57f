//! 設定檔
//!
//! TOML 格式，所有欄位都有預設值，空檔案即為預設設定。
//!
//! ```toml
//! [grid]
//! width = 800
//! height = 500
//! tile_footprint = 0.2
//! spacing_multiplier = 0.2
//!
//! [path]
//! segments = 20
//! control_height = 200.0
//!
//! [view]
//! radius = 12.0
//! tile_size = 1.0
//!
//! [costs]
//! Water = 3.5
//!
//! [dice]
//! Favorable = [0.05, 0.05, 0.15, 0.2, 0.25, 0.3]
//! ```

use crate::dice::{BiasType, DiceTable, DieWeights};
use crate::error::{LoadError, Result};
use crate::grid::GridSettings;
use crate::path::PathSettings;
use crate::terrain::{CostTable, TerrainType};
use crate::view_range::ViewRangeSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// 新場次的預設網格寬度
pub const DEFAULT_GRID_WIDTH: usize = 800;

/// 新場次的預設網格高度
pub const DEFAULT_GRID_HEIGHT: usize = 500;

/// 網格設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub tile_footprint: f32,
    pub spacing_multiplier: f32,
}

impl GridConfig {
    pub fn settings(&self) -> GridSettings {
        GridSettings {
            tile_footprint: self.tile_footprint,
            spacing_multiplier: self.spacing_multiplier,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let settings = GridSettings::default();
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            tile_footprint: settings.tile_footprint,
            spacing_multiplier: settings.spacing_multiplier,
        }
    }
}

/// 整體設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmConfig {
    pub grid: GridConfig,
    pub path: PathSettings,
    pub view: ViewRangeSettings,
    /// 地形名稱 → 成本倍率（覆寫預設值）
    pub costs: BTreeMap<String, f32>,
    /// 偏向名稱 → 六個骰面權重（覆寫預設值）
    pub dice: BTreeMap<String, DieWeights>,
}

impl GmConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            LoadError::DeserializeError {
                format: "TOML".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// 預設成本表加上設定檔的覆寫
    ///
    /// 無法辨識的地形名稱，以及非有限值或負數的倍率，會記錄並略過。
    pub fn cost_table(&self) -> CostTable {
        let mut table = CostTable::default();
        for (name, &multiplier) in &self.costs {
            let Ok(terrain) = TerrainType::from_str(name) else {
                warn!(name = %name, "設定檔中未知的地形名稱");
                continue;
            };
            if !multiplier.is_finite() || multiplier < 0.0 {
                warn!(name = %name, multiplier, "地形成本倍率無效，沿用預設值");
                continue;
            }
            table.set(terrain, multiplier);
        }
        table
    }

    /// 預設權重加上設定檔的覆寫，無法辨識的偏向名稱會記錄並略過
    pub fn dice_table(&self) -> DiceTable {
        let mut table = DiceTable::default();
        for (name, weights) in &self.dice {
            match BiasType::from_str(name) {
                Ok(bias) => table.set(bias, *weights),
                Err(_) => warn!(name = %name, "設定檔中未知的擲骰偏向"),
            }
        }
        table
    }
}
