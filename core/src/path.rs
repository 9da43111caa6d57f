//! 移動路徑與成本
//!
//! 起點到終點之間以二次貝茲曲線取樣，控制點位於中點正上方。
//! 成本為每段長度乘上該段中點所在地形的倍率後加總。

use crate::error::{PathError, Result};
use crate::grid::TerrainGrid;
use crate::terrain::{CostTable, TerrainType};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 預設分段數
pub const DEFAULT_SEGMENTS: u32 = 20;

/// 預設控制點高度
pub const DEFAULT_CONTROL_HEIGHT: f32 = 200.0;

/// 路徑取樣設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub segments: u32,
    pub control_height: f32,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            control_height: DEFAULT_CONTROL_HEIGHT,
        }
    }
}

/// 產生 `segments + 1` 個貝茲曲線取樣點
///
/// `B(t) = (1-t)²·start + 2(1-t)t·control + t²·end`，`t = i / segments`。
pub fn compute_path(start: Vec3, end: Vec3, segments: u32, control_height: f32) -> Result<Vec<Vec3>> {
    if segments == 0 {
        return Err(PathError::ZeroSegments.into());
    }

    let control = (start + end) * 0.5 + Vec3::Y * control_height;
    let points = (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            start * (u * u) + control * (2.0 * u * t) + end * (t * t)
        })
        .collect();
    Ok(points)
}

/// 以網格查詢地形計算路徑成本
pub fn compute_cost(path: &[Vec3], grid: &TerrainGrid, costs: &CostTable) -> f32 {
    compute_cost_with(path, |p| grid.tile_at(p), costs)
}

/// 以任意地形來源計算路徑成本
///
/// 少於兩個點時成本為 0。
pub fn compute_cost_with<F>(path: &[Vec3], terrain_at: F, costs: &CostTable) -> f32
where
    F: Fn(Vec3) -> Option<TerrainType>,
{
    path.windows(2)
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let midpoint = (a + b) * 0.5;
            a.distance(b) * costs.multiplier(terrain_at(midpoint))
        })
        .sum()
}

/// 顯示用成本（四捨五入到 10）
pub fn display_cost(cost: f32) -> i64 {
    ((cost / 10.0).round_ties_even() as i64) * 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_endpoints_and_apex() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(10.0, 0.0, 0.0);
        let path = compute_path(start, end, 2, 4.0).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], start);
        assert_eq!(path[2], end);
        // t = 0.5 時高度為控制點高度的一半
        assert!((path[1] - Vec3::new(5.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_segments_rejected() {
        assert!(compute_path(Vec3::ZERO, Vec3::X, 0, 1.0).is_err());
    }

    #[test]
    fn test_path_is_deterministic() {
        let a = compute_path(Vec3::ZERO, Vec3::new(3.0, 1.0, -7.0), 20, 200.0).unwrap();
        let b = compute_path(Vec3::ZERO, Vec3::new(3.0, 1.0, -7.0), 20, 200.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 21);
    }

    #[test]
    fn test_short_paths_cost_nothing() {
        let costs = CostTable::default();
        assert_eq!(compute_cost_with(&[], |_| None, &costs), 0.0);
        assert_eq!(compute_cost_with(&[Vec3::ONE], |_| None, &costs), 0.0);
    }

    #[test]
    fn test_cost_uses_midpoint_terrain() {
        let costs = CostTable::default();
        let path = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)];
        let cost = compute_cost_with(
            &path,
            |p| {
                if p.x < 2.0 {
                    Some(TerrainType::Water)
                } else {
                    None
                }
            },
            &costs,
        );
        // 2 * 3.0 + 2 * 1.0
        assert!((cost - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_display_cost() {
        assert_eq!(display_cost(0.0), 0);
        assert_eq!(display_cost(14.9), 10);
        assert_eq!(display_cost(16.0), 20);
        assert_eq!(display_cost(123.0), 120);
    }
}
