//! 整合測試共用工具

#![allow(dead_code)]

use gm_core::grid::{GridSettings, TerrainGrid};
use gm_core::terrain::TerrainType;
use glam::Vec3;

/// 格距為 1 的設定，方便用整數座標驗算
pub fn unit_settings() -> GridSettings {
    GridSettings {
        tile_footprint: 1.0,
        spacing_multiplier: 1.0,
    }
}

/// 沿 x 軸鋪一排地塊（z = 0），從 x = 0 到 x = len - 1
pub fn strip(len: usize, terrain: TerrainType) -> Vec<(Vec3, TerrainType)> {
    (0..len)
        .map(|x| (Vec3::new(x as f32, 0.0, 0.0), terrain))
        .collect()
}

/// 由地塊列表建立格距為 1 的網格
pub fn grid_from_tiles(tiles: &[(Vec3, TerrainType)]) -> TerrainGrid {
    let settings = unit_settings();
    let mut grid = TerrainGrid::create(1, 1, &settings).unwrap();
    grid.rebuild_from_tiles(tiles, &settings).unwrap();
    grid
}
