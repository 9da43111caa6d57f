//! 擲骰系統
//!
//! 偏向加權的六面骰與結果分級。行動裁定時，主持人選擇偏向，
//! 擲出 1..=6 後再換算成 `OutcomeTier`。

use crate::error::{DiceError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::warn;

/// 骰面數
pub const DIE_FACES: usize = 6;

/// 擲骰偏向
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
pub enum BiasType {
    VeryUnfavorable,
    Unfavorable,
    #[default]
    Neutral,
    Favorable,
    VeryFavorable,
}

impl BiasType {
    /// 從名稱解析偏向，無法辨識時退回 `Neutral`
    pub fn parse_or_neutral(name: &str) -> Self {
        match Self::from_str(name) {
            Ok(bias) => bias,
            Err(_) => {
                warn!(name, "未知的擲骰偏向，改用均勻權重");
                Self::Neutral
            }
        }
    }

    /// 各骰面的預設權重（依序為 1..=6）
    pub fn weights(&self) -> DieWeights {
        let raw = match self {
            Self::VeryUnfavorable => [0.4, 0.3, 0.15, 0.1, 0.04, 0.01],
            Self::Unfavorable => [0.3, 0.25, 0.2, 0.15, 0.07, 0.03],
            Self::Neutral => [1.0; DIE_FACES],
            Self::Favorable => [0.03, 0.07, 0.15, 0.2, 0.25, 0.3],
            Self::VeryFavorable => [0.01, 0.04, 0.1, 0.15, 0.3, 0.4],
        };
        DieWeights(raw)
    }
}

/// 六個骰面的權重，總和可為任意正數
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 6]", into = "[f32; 6]")]
pub struct DieWeights([f32; DIE_FACES]);

impl DieWeights {
    /// 建立權重表
    ///
    /// 權重必須是有限非負數，且總和大於 0。
    pub fn new(weights: [f32; DIE_FACES]) -> Result<Self> {
        let all_valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
        let total: f32 = weights.iter().sum();
        if !all_valid || total <= 0.0 {
            return Err(DiceError::InvalidWeights(weights).into());
        }
        Ok(Self(weights))
    }

    pub fn as_array(&self) -> [f32; DIE_FACES] {
        self.0
    }

    pub fn total(&self) -> f32 {
        self.0.iter().sum()
    }
}

impl TryFrom<[f32; DIE_FACES]> for DieWeights {
    type Error = crate::error::Error;

    fn try_from(weights: [f32; DIE_FACES]) -> Result<Self> {
        Self::new(weights)
    }
}

impl From<DieWeights> for [f32; DIE_FACES] {
    fn from(weights: DieWeights) -> Self {
        weights.0
    }
}

/// 行動結果分級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum OutcomeTier {
    CriticalFail,
    Fail,
    Mixed,
    Success,
    CriticalSuccess,
}

/// 依偏向擲一次加權六面骰
pub fn roll<R: Rng + ?Sized>(bias: BiasType, rng: &mut R) -> u8 {
    roll_with_weights(&bias.weights(), rng)
}

/// 各骰面（1..=6）對應的結果分級
const FACE_TIERS: [OutcomeTier; DIE_FACES] = [
    OutcomeTier::CriticalFail,
    OutcomeTier::Fail,
    OutcomeTier::Mixed,
    OutcomeTier::Mixed,
    OutcomeTier::Success,
    OutcomeTier::CriticalSuccess,
];

/// 以任意權重表擲骰
///
/// 在 `[0, total)` 取亂數 `r`，沿著累積權重找到第一個 `>= r` 的骰面。
/// 都沒有命中時（總和為 0 或浮點誤差）回傳 6。
pub fn roll_with_weights<R: Rng + ?Sized>(weights: &DieWeights, rng: &mut R) -> u8 {
    face_index(weights, rng) as u8 + 1
}

// 0 起算的骰面索引，必定小於 DIE_FACES
fn face_index<R: Rng + ?Sized>(weights: &DieWeights, rng: &mut R) -> usize {
    let last = DIE_FACES - 1;
    let total = weights.total();
    if total <= 0.0 || !total.is_finite() {
        return last;
    }

    let r: f32 = rng.random_range(0.0..total);
    let mut cumulative = 0.0_f32;
    weights
        .0
        .iter()
        .position(|weight| {
            cumulative += weight;
            r <= cumulative
        })
        .unwrap_or(last)
}

/// 骰面 → 結果分級
pub fn classify_outcome(face: u8) -> Result<OutcomeTier> {
    usize::from(face)
        .checked_sub(1)
        .and_then(|index| FACE_TIERS.get(index))
        .copied()
        .ok_or_else(|| DiceError::FaceOutOfRange(face).into())
}

/// 一次行動裁定的擲骰結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRoll {
    pub bias: BiasType,
    pub face: u8,
    pub outcome: OutcomeTier,
}

impl ActionRoll {
    /// 顯示給玩家的結果文字
    pub fn label(&self) -> String {
        self.outcome.to_string()
    }
}

/// 每種偏向的權重表，可由設定檔覆寫
#[derive(Debug, Clone, PartialEq)]
pub struct DiceTable {
    weights: HashMap<BiasType, DieWeights>,
}

impl DiceTable {
    pub fn set(&mut self, bias: BiasType, weights: DieWeights) {
        self.weights.insert(bias, weights);
    }

    pub fn weights(&self, bias: BiasType) -> DieWeights {
        self.weights
            .get(&bias)
            .copied()
            .unwrap_or_else(|| BiasType::Neutral.weights())
    }

    /// 擲骰並分級
    pub fn roll_action<R: Rng + ?Sized>(&self, bias: BiasType, rng: &mut R) -> ActionRoll {
        let index = face_index(&self.weights(bias), rng);
        ActionRoll {
            bias,
            face: index as u8 + 1,
            outcome: FACE_TIERS[index],
        }
    }
}

impl Default for DiceTable {
    fn default() -> Self {
        Self {
            weights: BiasType::iter().map(|b| (b, b.weights())).collect(),
        }
    }
}

/// 揭曉前輪播的畫面
pub const REVEAL_FRAMES: [&str; 3] = ["X", "O", "X"];

/// 每個畫面停留秒數
pub const REVEAL_FRAME_SECONDS: f32 = 0.4;

/// 揭曉過程中目前要顯示的內容
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealStep {
    Frame(&'static str),
    Resolved(ActionRoll),
}

impl RevealStep {
    pub fn text(&self) -> String {
        match self {
            Self::Frame(frame) => frame.to_string(),
            Self::Resolved(roll) => roll.label(),
        }
    }
}

/// 分段揭曉擲骰結果的狀態機
///
/// 由外部以 `tick` 推進；最後一個畫面結束時才真正擲骰。
#[derive(Debug, Clone)]
pub struct RollReveal {
    bias: BiasType,
    frame: usize,
    elapsed: f32,
    result: Option<ActionRoll>,
}

impl RollReveal {
    pub fn new(bias: BiasType) -> Self {
        Self {
            bias,
            frame: 0,
            elapsed: 0.0,
            result: None,
        }
    }

    pub fn bias(&self) -> BiasType {
        self.bias
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<ActionRoll> {
        self.result
    }

    pub fn current(&self) -> RevealStep {
        match self.result {
            Some(roll) => RevealStep::Resolved(roll),
            None => RevealStep::Frame(REVEAL_FRAMES[self.frame]),
        }
    }

    /// 推進 `dt` 秒
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, table: &DiceTable, rng: &mut R) -> RevealStep {
        if self.result.is_some() {
            return self.current();
        }

        self.elapsed += dt.max(0.0);
        while self.result.is_none() && self.elapsed >= REVEAL_FRAME_SECONDS {
            self.elapsed -= REVEAL_FRAME_SECONDS;
            self.frame += 1;
            if self.frame >= REVEAL_FRAMES.len() {
                self.frame = REVEAL_FRAMES.len() - 1;
                self.result = Some(table.roll_action(self.bias, rng));
            }
        }

        self.current()
    }
}
