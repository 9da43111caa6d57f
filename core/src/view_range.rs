//! 單位視野範圍
//!
//! 以單位為中心、邊長 `tile_size` 的方格近似圓形視野：格子中心距離
//! `<= radius` 即在範圍內。外框由「範圍內格子」與「範圍外鄰格」之間的
//! 邊組成，用來在地圖上畫出視野圈。

use crate::error::{GridError, Result};
use crate::grid::checked_cell_count;
use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

/// 預設視野半徑
pub const DEFAULT_VIEW_RADIUS: f32 = 12.0;

/// 預設視野方格邊長
pub const DEFAULT_VIEW_TILE_SIZE: f32 = 1.0;

/// 外框線段高出地面的距離
pub const RING_LIFT: f32 = 1.0;

const NEIGHBOURS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// 視野設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewRangeSettings {
    pub radius: f32,
    pub tile_size: f32,
}

impl Default for ViewRangeSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_VIEW_RADIUS,
            tile_size: DEFAULT_VIEW_TILE_SIZE,
        }
    }
}

/// 外框上的一段邊
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub start: Vec3,
    pub end: Vec3,
}

/// 範圍內的格子偏移（x, z），以中心格為 (0, 0)
///
/// 掃描 `ceil(radius / tile_size)` 的正方形，保留中心距離平方 `<= radius²` 的格子。
/// 順序為 x 由小到大、同一 x 內 z 由小到大。
pub fn view_range_cells(radius: f32, tile_size: f32) -> Result<Vec<IVec2>> {
    let reach = grid_reach(radius, tile_size)?;
    let mut cells = Vec::new();
    for x in -reach..=reach {
        for z in -reach..=reach {
            let offset = IVec2::new(x, z);
            if in_range(offset, radius, tile_size) {
                cells.push(offset);
            }
        }
    }
    Ok(cells)
}

/// 視野外框線段，高度固定為 `center.y + RING_LIFT`
pub fn view_ring_edges(center: Vec3, radius: f32, tile_size: f32) -> Result<Vec<EdgeSegment>> {
    view_ring_edges_with(center, radius, tile_size, |_| center.y)
}

/// 視野外框線段，端點高度由 `height_at` 取樣後再加上 `RING_LIFT`
///
/// 每個範圍內格子依右、左、前、後的順序檢查鄰格，鄰格在範圍外時產生一段
/// 長度為 `tile_size` 的邊。
pub fn view_ring_edges_with<F>(center: Vec3, radius: f32, tile_size: f32, height_at: F) -> Result<Vec<EdgeSegment>>
where
    F: Fn(Vec3) -> f32,
{
    let half = tile_size / 2.0;
    let lift = |p: Vec3| Vec3::new(p.x, height_at(p) + RING_LIFT, p.z);

    let mut edges = Vec::new();
    for cell in view_range_cells(radius, tile_size)? {
        for dir in NEIGHBOURS {
            if in_range(cell + dir, radius, tile_size) {
                continue;
            }
            let tile = center + Vec3::new(cell.x as f32 * tile_size, 0.0, cell.y as f32 * tile_size);
            // 沿著該方向的邊，兩端分別在垂直方向的 -half / +half
            let (start, end) = if dir.x != 0 {
                let x = dir.x as f32 * half;
                (Vec3::new(x, 0.0, -half), Vec3::new(x, 0.0, half))
            } else {
                let z = dir.y as f32 * half;
                (Vec3::new(-half, 0.0, z), Vec3::new(half, 0.0, z))
            };
            edges.push(EdgeSegment {
                start: lift(tile + start),
                end: lift(tile + end),
            });
        }
    }
    Ok(edges)
}

fn in_range(offset: IVec2, radius: f32, tile_size: f32) -> bool {
    let center = offset.as_vec2() * tile_size;
    center.length_squared() <= radius * radius
}

// 掃描正方形的半邊長（格數）
fn grid_reach(radius: f32, tile_size: f32) -> Result<i32> {
    let invalid = || GridError::InvalidViewRange { radius, tile_size };
    if !radius.is_finite() || radius < 0.0 || !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(invalid().into());
    }
    let reach = (radius / tile_size).ceil();
    if !reach.is_finite() || reach >= (i32::MAX / 4) as f32 {
        return Err(invalid().into());
    }
    let reach = reach as i32;
    let side = (2 * reach + 1) as usize;
    checked_cell_count(side, side)?;
    Ok(reach)
}
