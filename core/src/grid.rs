//! 地形網格
//!
//! 固定大小的二維地形陣列。世界座標以 y 軸朝上，網格鋪在 x/z 平面，
//! 以原點偏移與均勻格距換算格子索引。

use crate::error::{GridError, Result};
use crate::terrain::TerrainType;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 未偵測到地塊尺寸時的預設值
pub const DEFAULT_TILE_FOOTPRINT: f32 = 0.2;

/// 預設格距倍率
pub const DEFAULT_SPACING_MULTIPLIER: f32 = 0.2;

/// 單一網格的格子數上限（4096 x 4096）
pub const MAX_GRID_CELLS: usize = 4096 * 4096;

/// 檢查尺寸並回傳格子總數
pub(crate) fn checked_cell_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .filter(|&count| count <= MAX_GRID_CELLS)
        .ok_or_else(|| {
            GridError::TooLarge {
                width,
                height,
                max_cells: MAX_GRID_CELLS,
            }
            .into()
        })
}

// 跨距 / 格距 → 格子數；無法表示時飽和到 usize::MAX，交給 checked_cell_count 拒絕
fn span_to_cells(span: f32, spacing: f32) -> usize {
    let steps = (span / spacing).ceil();
    if steps.is_nan() || steps < 0.0 {
        return 1;
    }
    (steps as usize).saturating_add(1)
}

/// 格距設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// 參考地塊在 x 軸上的寬度
    pub tile_footprint: f32,
    pub spacing_multiplier: f32,
}

impl GridSettings {
    /// `spacing = tile_footprint * spacing_multiplier`，必須為有限正數
    pub fn spacing(&self) -> Result<f32> {
        let spacing = self.tile_footprint * self.spacing_multiplier;
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(GridError::InvalidSpacing {
                tile_footprint: self.tile_footprint,
                spacing_multiplier: self.spacing_multiplier,
            }
            .into());
        }
        Ok(spacing)
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            tile_footprint: DEFAULT_TILE_FOOTPRINT,
            spacing_multiplier: DEFAULT_SPACING_MULTIPLIER,
        }
    }
}

/// 格子座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// 重建結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub placed: usize,
    pub dropped: usize,
}

/// 地形網格
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    /// 格子 (0, 0) 的世界座標（x, z）
    origin: Vec2,
    spacing: f32,
    cells: Vec<TerrainType>,
}

impl TerrainGrid {
    /// 建立以世界原點為中心的網格，所有格子為 `TerrainType::None`
    pub fn create(width: usize, height: usize, settings: &GridSettings) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height }.into());
        }
        let count = checked_cell_count(width, height)?;
        let spacing = settings.spacing()?;
        let origin = Vec2::new(
            -(width as f32 * spacing) / 2.0 + spacing / 2.0,
            -(height as f32 * spacing) / 2.0 + spacing / 2.0,
        );
        info!(width, height, spacing, ?origin, "建立地形網格");

        Ok(Self {
            width,
            height,
            origin,
            spacing,
            cells: vec![TerrainType::None; count],
        })
    }

    /// 由帶地形標記的世界座標重建網格
    ///
    /// 邊界取所有有限座標的最小/最大值，原點設為最小值。捨入後落在網格外的
    /// 地塊會記錄並丟棄。空列表時網格維持原狀；邊界換算後超過
    /// `MAX_GRID_CELLS` 時回傳 `GridError::TooLarge`，網格同樣維持原狀。
    pub fn rebuild_from_tiles(&mut self, tiles: &[(Vec3, TerrainType)], settings: &GridSettings) -> Result<RebuildReport> {
        if tiles.is_empty() {
            warn!("沒有地塊可供重建網格，維持原狀");
            return Ok(RebuildReport::default());
        }
        let spacing = settings.spacing()?;

        let finite = tiles
            .iter()
            .map(|(pos, _)| Vec2::new(pos.x, pos.z))
            .filter(|p| p.is_finite());
        let Some((min, max)) = finite.fold(None, |bounds: Option<(Vec2, Vec2)>, p| match bounds {
            Some((min, max)) => Some((min.min(p), max.max(p))),
            None => Some((p, p)),
        }) else {
            warn!(tiles = tiles.len(), "地塊座標皆非有限值，維持原狀");
            return Ok(RebuildReport {
                placed: 0,
                dropped: tiles.len(),
            });
        };

        let width = span_to_cells(max.x - min.x, spacing);
        let height = span_to_cells(max.y - min.y, spacing);
        let count = checked_cell_count(width, height)?;

        self.width = width;
        self.height = height;
        self.origin = min;
        self.spacing = spacing;
        self.cells = vec![TerrainType::None; count];

        let mut report = RebuildReport::default();
        for (pos, terrain) in tiles {
            match self.cell_at(*pos) {
                Some(cell) => {
                    let index = self.index(cell);
                    self.cells[index] = *terrain;
                    report.placed += 1;
                }
                None => {
                    warn!(?pos, %terrain, "地塊超出網格邊界，已略過");
                    report.dropped += 1;
                }
            }
        }

        info!(width, height, placed = report.placed, dropped = report.dropped, "重建地形網格");
        Ok(report)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// 格子 (0, 0) 的世界座標（x, z）
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// 世界座標 → 格子，超出網格時回傳 `None`
    ///
    /// 捨入採用「四捨六入五成雙」。
    pub fn cell_at(&self, world: Vec3) -> Option<Cell> {
        let ix = ((world.x - self.origin.x) / self.spacing).round_ties_even();
        let iy = ((world.z - self.origin.y) / self.spacing).round_ties_even();
        if !ix.is_finite() || !iy.is_finite() {
            return None;
        }
        if ix < 0.0 || iy < 0.0 || ix >= self.width as f32 || iy >= self.height as f32 {
            return None;
        }
        Some(Cell {
            x: ix as usize,
            y: iy as usize,
        })
    }

    /// 查詢世界座標上的地形
    ///
    /// 路徑取樣接近邊緣時常會查到網格外，因此只記錄 debug。
    pub fn tile_at(&self, world: Vec3) -> Option<TerrainType> {
        match self.cell_at(world) {
            Some(cell) => Some(self.cells[self.index(cell)]),
            None => {
                debug!(?world, "查詢位置不在網格內");
                None
            }
        }
    }

    /// 依格子座標查詢地形
    pub fn terrain_at(&self, x: usize, y: usize) -> Option<TerrainType> {
        if self.contains(x, y) {
            Some(self.cells[self.index(Cell { x, y })])
        } else {
            None
        }
    }

    /// 寫入單一格子，越界時不做任何事並回傳 `false`
    pub fn set_tile(&mut self, x: usize, y: usize, terrain: TerrainType) -> bool {
        if !self.contains(x, y) {
            warn!(x, y, width = self.width, height = self.height, "寫入位置超出網格邊界");
            return false;
        }
        let index = self.index(Cell { x, y });
        self.cells[index] = terrain;
        true
    }

    /// 格子中心的世界座標（y = 0）
    pub fn cell_world_position(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(
            self.origin.x + x as f32 * self.spacing,
            0.0,
            self.origin.y + y as f32 * self.spacing,
        )
    }

    /// 找出所有指定地形的格子
    pub fn find_tiles_of_type(&self, terrain: TerrainType) -> Vec<Cell> {
        let mut found = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let cell = Cell { x, y };
                if self.cells[self.index(cell)] == terrain {
                    found.push(cell);
                }
            }
        }
        found
    }

    fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, cell: Cell) -> usize {
        cell.y * self.width + cell.x
    }
}

/// 地形筆刷
///
/// 拖曳時同一格只寫一次；未選取地形時不會繪製。
#[derive(Debug, Clone, Default)]
pub struct TerrainBrush {
    selected: Option<TerrainType>,
    last_cell: Option<Cell>,
}

impl TerrainBrush {
    pub fn select(&mut self, terrain: TerrainType) {
        self.selected = Some(terrain);
        self.last_cell = None;
    }

    /// 依索引選取地形，索引無效時回傳 `false`
    pub fn select_index(&mut self, index: usize) -> bool {
        match TerrainType::from_index(index) {
            Some(terrain) => {
                self.select(terrain);
                true
            }
            None => {
                warn!(index, "無效的地形索引");
                false
            }
        }
    }

    pub fn selected(&self) -> Option<TerrainType> {
        self.selected
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.last_cell = None;
    }

    /// 在世界座標上繪製，回傳實際寫入的格子
    pub fn paint_at(&mut self, grid: &mut TerrainGrid, world: Vec3) -> Option<Cell> {
        let terrain = self.selected?;
        let cell = grid.cell_at(world)?;
        if self.last_cell == Some(cell) {
            return None;
        }
        self.last_cell = Some(cell);
        grid.set_tile(cell.x, cell.y, terrain).then_some(cell)
    }

    /// 放開滑鼠，下一次拖曳可再次寫入同一格
    pub fn release(&mut self) {
        self.last_cell = None;
    }
}
