//! 地形類型與移動成本表

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// 地形類型（網格格子的表面材質）
///
/// 宣告順序即為索引順序，筆刷以索引選取地形。
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum TerrainType {
    #[default]
    None,
    Grass,
    Sand,
    Water,
    Rock,
    Gravel,
    DirtRoad,
    Hill,
    Forest,
    Asphalt,
    Mud,
    Snow,
}

impl TerrainType {
    /// 依宣告索引取得地形
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// 預設移動成本倍率
    pub fn default_cost(&self) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Grass => 1.0,
            Self::Sand => 1.5,
            Self::Water => 3.0,
            Self::Rock => 4.0,
            Self::Gravel => 1.2,
            Self::DirtRoad => 0.5,
            Self::Hill => 2.0,
            Self::Forest => 2.5,
            Self::Asphalt => 0.8,
            Self::Mud => 2.0,
            Self::Snow => 1.8,
        }
    }
}

/// 沒有明確設定時使用的倍率
pub const DEFAULT_COST_MULTIPLIER: f32 = 1.0;

/// 地形 → 移動成本倍率
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    multipliers: HashMap<TerrainType, f32>,
}

impl CostTable {
    /// 空表：所有地形都使用 `DEFAULT_COST_MULTIPLIER`
    pub fn empty() -> Self {
        Self {
            multipliers: HashMap::new(),
        }
    }

    pub fn set(&mut self, terrain: TerrainType, multiplier: f32) {
        self.multipliers.insert(terrain, multiplier);
    }

    /// 查詢倍率；找不到地形（`None`）或未設定時回傳 1.0
    pub fn multiplier(&self, terrain: Option<TerrainType>) -> f32 {
        terrain
            .and_then(|t| self.multipliers.get(&t).copied())
            .unwrap_or(DEFAULT_COST_MULTIPLIER)
    }

    /// 以另一張表覆寫對應項目
    pub fn merge(&mut self, overrides: &CostTable) {
        for (terrain, multiplier) in &overrides.multipliers {
            self.multipliers.insert(*terrain, *multiplier);
        }
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            multipliers: TerrainType::iter().map(|t| (t, t.default_cost())).collect(),
        }
    }
}
