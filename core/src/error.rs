//! 錯誤處理系統
//!
//! 每個關注點各自一個 thiserror 列舉，頂層 `Error` 再附上 context 鏈。
//! 非致命狀況（越界寫入、被丟棄的地塊）只記錄 log，不會走到這裡。

use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Dice(#[from] DiceError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// 地形網格錯誤
#[derive(Debug, ThisError)]
pub enum GridError {
    #[error("網格尺寸無效: {width} x {height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("網格過大: {width} x {height}，上限 {max_cells} 格")]
    TooLarge {
        width: usize,
        height: usize,
        max_cells: usize,
    },
    #[error("視野範圍無效: radius {radius}, tile_size {tile_size}")]
    InvalidViewRange { radius: f32, tile_size: f32 },
    #[error("格距無效: tile_footprint {tile_footprint} * spacing_multiplier {spacing_multiplier}")]
    InvalidSpacing {
        tile_footprint: f32,
        spacing_multiplier: f32,
    },
}

/// 擲骰錯誤
#[derive(Debug, ThisError)]
pub enum DiceError {
    #[error("骰面超出範圍 1..=6: {0}")]
    FaceOutOfRange(u8),
    #[error("權重無效: {0:?}")]
    InvalidWeights([f32; 6]),
}

/// 路徑錯誤
#[derive(Debug, ThisError)]
pub enum PathError {
    #[error("貝茲曲線分段數必須大於 0")]
    ZeroSegments,
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("讀取檔案失敗 {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("解析失敗（第 {line} 行）: {reason}")]
    ParseError { line: usize, reason: String },
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{format} 序列化失敗: {reason}")]
    SerializeError { format: String, reason: String },
    #[error("網格模型沒有任何三角形")]
    EmptyMesh,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// context 鏈，由內而外，每項附帶呼叫位置
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// 是否為網格尺寸或格距造成的錯誤
    pub fn is_grid_sizing(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Grid(
                GridError::InvalidDimensions { .. } | GridError::TooLarge { .. } | GridError::InvalidSpacing { .. }
            )
        )
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.context(context)),
        }
    }
}
