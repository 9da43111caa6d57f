//! 場次狀態與指令分派
//!
//! `Session` 擁有單一場次的所有狀態（網格、筆刷、移動覆蓋層、擲骰揭曉），
//! 介面層只送出 `Command`，並依回傳的 `Event` 更新畫面。

use crate::config::GmConfig;
use crate::dice::{ActionRoll, BiasType, DiceTable, RevealStep, RollReveal};
use crate::error::{Context, Result};
use crate::grid::{Cell, RebuildReport, TerrainBrush, TerrainGrid};
use crate::movement::{MovementOverlay, OverlayState, PathPreview};
use crate::save::SaveData;
use crate::terrain::{CostTable, TerrainType};
use crate::view_range::{view_ring_edges, EdgeSegment};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// 介面層送出的指令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateGrid { width: usize, height: usize },
    SelectTerrain(TerrainType),
    Paint { at: Vec3 },
    ReleaseBrush,
    ResetBrush,
    RebuildFromSave(SaveData),
    BeginMove { start: Vec3 },
    UpdateMove { pointer: Vec3 },
    ConfirmMove,
    CancelMove,
    Roll { bias: BiasType },
    Tick { dt: f32 },
    ShowViewRange { center: Vec3 },
}

/// 指令執行後的結果
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    GridCreated { width: usize, height: usize },
    TerrainSelected(TerrainType),
    Painted(Option<Cell>),
    BrushReleased,
    BrushReset,
    GridRebuilt(RebuildReport),
    MoveStarted { start: Vec3 },
    PathPreviewed(Option<PathPreview>),
    MoveConfirmed(Vec<Vec3>),
    MoveCancelled,
    RollStarted(BiasType),
    RollProgress(RevealStep),
    ViewRangeShown(Vec<EdgeSegment>),
    Idle,
}

#[derive(Debug)]
pub struct Session {
    config: GmConfig,
    grid: TerrainGrid,
    costs: CostTable,
    dice: DiceTable,
    brush: TerrainBrush,
    overlay: MovementOverlay,
    reveal: Option<RollReveal>,
    last_roll: Option<ActionRoll>,
    rng: StdRng,
}

impl Session {
    pub fn new(config: GmConfig) -> Result<Self> {
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::with_rng(config, rng)
    }

    /// 固定亂數種子，供重播與測試使用
    pub fn with_seed(config: GmConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GmConfig, rng: StdRng) -> Result<Self> {
        let grid = TerrainGrid::create(config.grid.width, config.grid.height, &config.grid.settings())
            .context("建立場次網格")?;
        Ok(Self {
            costs: config.cost_table(),
            dice: config.dice_table(),
            config,
            grid,
            brush: TerrainBrush::default(),
            overlay: MovementOverlay::default(),
            reveal: None,
            last_roll: None,
            rng,
        })
    }

    pub fn config(&self) -> &GmConfig {
        &self.config
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    pub fn brush(&self) -> &TerrainBrush {
        &self.brush
    }

    pub fn overlay(&self) -> &MovementOverlay {
        &self.overlay
    }

    /// 最近一次揭曉的擲骰結果
    pub fn last_roll(&self) -> Option<ActionRoll> {
        self.last_roll
    }

    /// 執行指令
    pub fn apply(&mut self, command: Command) -> Result<Event> {
        debug!(?command, "執行指令");
        let event = match command {
            Command::CreateGrid { width, height } => {
                self.grid = TerrainGrid::create(width, height, &self.config.grid.settings())
                    .context("重新建立網格")?;
                self.brush.release();
                self.overlay.cancel();
                Event::GridCreated { width, height }
            }
            Command::SelectTerrain(terrain) => {
                self.brush.select(terrain);
                Event::TerrainSelected(terrain)
            }
            Command::Paint { at } => Event::Painted(self.brush.paint_at(&mut self.grid, at)),
            Command::ReleaseBrush => {
                self.brush.release();
                Event::BrushReleased
            }
            Command::ResetBrush => {
                self.brush.reset();
                Event::BrushReset
            }
            Command::RebuildFromSave(save) => {
                let tiles = save.terrain_tiles();
                let report = self
                    .grid
                    .rebuild_from_tiles(&tiles, &self.config.grid.settings())
                    .context(format!("從存檔 {} 重建網格", save.save_name))?;
                self.brush.release();
                info!(save = %save.save_name, placed = report.placed, "已載入存檔地形");
                Event::GridRebuilt(report)
            }
            Command::BeginMove { start } => {
                self.overlay.begin(start);
                Event::MoveStarted { start }
            }
            Command::UpdateMove { pointer } => {
                let preview = self
                    .overlay
                    .update(pointer, &self.config.path, &self.grid, &self.costs)
                    .context("更新移動路徑")?
                    .cloned();
                Event::PathPreviewed(preview)
            }
            Command::ConfirmMove => match self.overlay.confirm() {
                Some(path) => Event::MoveConfirmed(path.to_vec()),
                None => Event::Idle,
            },
            Command::CancelMove => {
                if self.overlay.state() == OverlayState::Idle {
                    Event::Idle
                } else {
                    self.overlay.cancel();
                    Event::MoveCancelled
                }
            }
            Command::Roll { bias } => {
                self.reveal = Some(RollReveal::new(bias));
                Event::RollStarted(bias)
            }
            Command::Tick { dt } => self.tick(dt),
            Command::ShowViewRange { center } => {
                let view = self.config.view;
                let edges = view_ring_edges(center, view.radius, view.tile_size).context("計算視野外框")?;
                debug!(?center, segments = edges.len(), "視野外框");
                Event::ViewRangeShown(edges)
            }
        };
        Ok(event)
    }

    fn tick(&mut self, dt: f32) -> Event {
        let Some(reveal) = self.reveal.as_mut() else {
            return Event::Idle;
        };

        let step = reveal.tick(dt, &self.dice, &mut self.rng);
        if let RevealStep::Resolved(roll) = step {
            info!(bias = %roll.bias, face = roll.face, outcome = %roll.outcome, "擲骰結果");
            self.last_roll = Some(roll);
            self.reveal = None;
        }
        Event::RollProgress(step)
    }

    /// 略過揭曉動畫直接擲骰
    pub fn roll_now(&mut self, bias: BiasType) -> ActionRoll {
        let roll = self.dice.roll_action(bias, &mut self.rng);
        self.last_roll = Some(roll);
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn small_config() -> GmConfig {
        GmConfig {
            grid: GridConfig {
                width: 10,
                height: 10,
                tile_footprint: 1.0,
                spacing_multiplier: 1.0,
            },
            ..GmConfig::default()
        }
    }

    #[test]
    fn test_paint_through_commands() {
        let mut session = Session::with_seed(small_config(), 1).unwrap();
        let target = session.grid().cell_world_position(3, 4);

        assert_eq!(session.apply(Command::Paint { at: target }).unwrap(), Event::Painted(None));
        session.apply(Command::SelectTerrain(TerrainType::Water)).unwrap();
        assert_eq!(
            session.apply(Command::Paint { at: target }).unwrap(),
            Event::Painted(Some(Cell { x: 3, y: 4 }))
        );
        assert_eq!(session.grid().tile_at(target), Some(TerrainType::Water));
    }

    #[test]
    fn test_roll_resolves_after_ticks() {
        let mut session = Session::with_seed(small_config(), 9).unwrap();
        assert_eq!(session.apply(Command::Tick { dt: 1.0 }).unwrap(), Event::Idle);

        session.apply(Command::Roll { bias: BiasType::VeryFavorable }).unwrap();
        let event = session.apply(Command::Tick { dt: 0.4 }).unwrap();
        assert_eq!(event, Event::RollProgress(RevealStep::Frame("O")));
        assert!(session.last_roll().is_none());

        let event = session.apply(Command::Tick { dt: 1.0 }).unwrap();
        let roll = session.last_roll().unwrap();
        assert_eq!(event, Event::RollProgress(RevealStep::Resolved(roll)));
        assert_eq!(roll.bias, BiasType::VeryFavorable);
    }

    #[test]
    fn test_cancel_while_idle() {
        let mut session = Session::with_seed(small_config(), 2).unwrap();
        assert_eq!(session.apply(Command::CancelMove).unwrap(), Event::Idle);
        assert_eq!(session.apply(Command::ConfirmMove).unwrap(), Event::Idle);
    }

    #[test]
    fn test_invalid_grid_reports_context() {
        let mut session = Session::with_seed(small_config(), 2).unwrap();
        let err = session
            .apply(Command::CreateGrid { width: 0, height: 3 })
            .unwrap_err();
        assert!(err.to_string().contains("重新建立網格"));
        // 原網格保持不變
        assert_eq!(session.grid().width(), 10);
    }

    #[test]
    fn test_oversized_grid_keeps_previous() {
        let mut session = Session::with_seed(small_config(), 2).unwrap();
        session.apply(Command::SelectTerrain(TerrainType::Rock)).unwrap();
        session.apply(Command::Paint { at: Vec3::ZERO }).unwrap();
        let before = session.grid().clone();

        let err = session
            .apply(Command::CreateGrid {
                width: usize::MAX,
                height: 2,
            })
            .unwrap_err();
        assert!(err.is_grid_sizing());
        assert!(err.to_string().contains("重新建立網格"));
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn test_new_grid_accepts_first_paint() {
        let mut session = Session::with_seed(small_config(), 3).unwrap();
        let target = session.grid().cell_world_position(2, 2);
        session.apply(Command::SelectTerrain(TerrainType::Mud)).unwrap();
        assert_eq!(
            session.apply(Command::Paint { at: target }).unwrap(),
            Event::Painted(Some(Cell { x: 2, y: 2 }))
        );

        // 同尺寸重建後同一格要能立即繪製
        session.apply(Command::CreateGrid { width: 10, height: 10 }).unwrap();
        assert_eq!(session.grid().terrain_at(2, 2), Some(TerrainType::None));
        assert_eq!(
            session.apply(Command::Paint { at: target }).unwrap(),
            Event::Painted(Some(Cell { x: 2, y: 2 }))
        );
        assert_eq!(session.grid().terrain_at(2, 2), Some(TerrainType::Mud));
    }

    #[test]
    fn test_show_view_range() {
        let mut config = small_config();
        config.view.radius = 1.0;
        let mut session = Session::with_seed(config, 4).unwrap();
        let event = session
            .apply(Command::ShowViewRange {
                center: Vec3::new(2.0, 0.0, 2.0),
            })
            .unwrap();
        let Event::ViewRangeShown(edges) = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(edges.len(), 12);

        session.config.view.tile_size = 0.0;
        assert!(session.apply(Command::ShowViewRange { center: Vec3::ZERO }).is_err());
    }
}
