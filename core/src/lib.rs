//! 桌上兵棋主持人工具核心函式庫
//!
//! 從場景編輯器抽出的可攜邏輯：
//! - 加權六面骰與行動結果分級
//! - 地形網格（世界座標 ↔ 格子索引）
//! - 貝茲曲線移動路徑與地形加權成本
//! - 單位視野範圍與外框
//! - 場次狀態、存檔與地形模型載入

pub mod config;
pub mod dice;
pub mod error;
pub mod grid;
pub mod movement;
pub mod obj;
pub mod path;
pub mod save;
pub mod session;
pub mod terrain;
pub mod view_range;

// 重新導出常用類型
pub use config::GmConfig;
pub use dice::{classify_outcome, roll, ActionRoll, BiasType, DieWeights, OutcomeTier};
pub use error::{Error, Result};
pub use grid::{Cell, GridSettings, TerrainBrush, TerrainGrid};
pub use movement::{MovementOverlay, PathPreview};
pub use path::{compute_cost, compute_path, PathSettings};
pub use session::{Command, Event, Session};
pub use terrain::{CostTable, TerrainType};
pub use view_range::{view_range_cells, view_ring_edges, EdgeSegment, ViewRangeSettings};
