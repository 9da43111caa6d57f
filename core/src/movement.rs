//! 單位移動覆蓋層
//!
//! 狀態只有兩種：閒置與拖曳中。拖曳時每次指標更新都重算預覽；
//! 確認時把最後一次預覽凍結為已儲存路徑，取消則直接丟棄。

use crate::error::Result;
use crate::grid::TerrainGrid;
use crate::path::{compute_cost, compute_path, display_cost, PathSettings};
use crate::terrain::CostTable;
use glam::Vec3;

/// 覆蓋層狀態
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayState {
    Idle,
    Dragging { start: Vec3 },
}

/// 拖曳中的路徑預覽
#[derive(Debug, Clone, PartialEq)]
pub struct PathPreview {
    pub points: Vec<Vec3>,
    pub cost: f32,
    pub display_cost: i64,
}

#[derive(Debug, Clone)]
pub struct MovementOverlay {
    state: OverlayState,
    preview: Option<PathPreview>,
    saved_path: Vec<Vec3>,
}

impl Default for MovementOverlay {
    fn default() -> Self {
        Self {
            state: OverlayState::Idle,
            preview: None,
            saved_path: Vec::new(),
        }
    }
}

impl MovementOverlay {
    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn preview(&self) -> Option<&PathPreview> {
        self.preview.as_ref()
    }

    /// 最近一次確認的路徑
    pub fn saved_path(&self) -> &[Vec3] {
        &self.saved_path
    }

    /// 從單位目前位置開始拖曳，清除先前儲存的路徑
    pub fn begin(&mut self, start: Vec3) {
        self.state = OverlayState::Dragging { start };
        self.preview = None;
        self.saved_path.clear();
    }

    /// 依指標位置重算預覽；閒置時回傳 `None`
    pub fn update(
        &mut self,
        pointer: Vec3,
        settings: &PathSettings,
        grid: &TerrainGrid,
        costs: &CostTable,
    ) -> Result<Option<&PathPreview>> {
        let OverlayState::Dragging { start } = self.state else {
            return Ok(None);
        };

        let points = compute_path(start, pointer, settings.segments, settings.control_height)?;
        let cost = compute_cost(&points, grid, costs);
        self.preview = Some(PathPreview {
            points,
            cost,
            display_cost: display_cost(cost),
        });
        Ok(self.preview.as_ref())
    }

    /// 確認並凍結最後一次預覽
    pub fn confirm(&mut self) -> Option<&[Vec3]> {
        if self.state == OverlayState::Idle {
            return None;
        }
        self.state = OverlayState::Idle;
        if let Some(preview) = self.preview.take() {
            self.saved_path = preview.points;
        }
        Some(&self.saved_path)
    }

    /// 取消拖曳，丟棄預覽
    pub fn cancel(&mut self) {
        self.state = OverlayState::Idle;
        self.preview = None;
    }
}
