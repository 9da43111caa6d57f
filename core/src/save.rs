//! 場次存檔
//!
//! JSON 格式，欄位名稱沿用編輯器的 camelCase。

use crate::error::{LoadError, Result};
use crate::terrain::TerrainType;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// `{x, y, z}` 形式的向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedVector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for SavedVector3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<SavedVector3> for Vec3 {
    fn from(v: SavedVector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// `{x, y, z, w}` 形式的旋轉
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedQuaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for SavedQuaternion {
    fn default() -> Self {
        Quat::IDENTITY.into()
    }
}

impl From<Quat> for SavedQuaternion {
    fn from(q: Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<SavedQuaternion> for Quat {
    fn from(q: SavedQuaternion) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

fn default_attribute() -> i32 {
    1
}

/// 場景中的一個可存檔物件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub object_given_name: Option<String>,
    #[serde(default)]
    pub position: SavedVector3,
    #[serde(default)]
    pub rotation: SavedQuaternion,
    /// 地塊才有地形名稱
    #[serde(default)]
    pub terrain_type: Option<String>,
    #[serde(default)]
    pub prefab_name: Option<String>,
    #[serde(default)]
    pub item_type: i32,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default = "default_attribute")]
    pub proficiency: i32,
    #[serde(default = "default_attribute")]
    pub fatigue: i32,
    #[serde(default = "default_attribute")]
    pub comms_clarity: i32,
    #[serde(default = "default_attribute")]
    pub equipment: i32,
}

impl ObjectData {
    /// 建立地塊物件
    pub fn terrain_tile(name: impl Into<String>, position: Vec3, terrain: TerrainType) -> Self {
        Self {
            object_name: name.into(),
            object_given_name: None,
            position: position.into(),
            rotation: SavedQuaternion::default(),
            terrain_type: Some(terrain.to_string()),
            prefab_name: None,
            item_type: 0,
            team: None,
            proficiency: default_attribute(),
            fatigue: default_attribute(),
            comms_clarity: default_attribute(),
            equipment: default_attribute(),
        }
    }
}

/// 匯入地形模型的資訊
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaeaMapData {
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub obj_path: String,
    #[serde(default)]
    pub map_position: SavedVector3,
    #[serde(default)]
    pub map_scale: SavedVector3,
}

/// 場次存檔
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(default)]
    pub save_name: String,
    #[serde(default)]
    pub objects: Vec<ObjectData>,
    #[serde(default)]
    pub gaea_map_data: Option<GaeaMapData>,
}

impl SaveData {
    pub fn new(save_name: impl Into<String>) -> Self {
        Self {
            save_name: save_name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            LoadError::DeserializeError {
                format: "JSON".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LoadError::SerializeError {
                format: "JSON".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// 取出所有地塊（位置 + 地形）
    ///
    /// 沒有 `terrainType` 的物件不是地塊；無法辨識的地形名稱會記錄並略過。
    pub fn terrain_tiles(&self) -> Vec<(Vec3, TerrainType)> {
        self.objects
            .iter()
            .filter_map(|obj| {
                let name = obj.terrain_type.as_deref()?;
                match TerrainType::from_str(name) {
                    Ok(terrain) => Some((obj.position.into(), terrain)),
                    Err(_) => {
                        warn!(object = %obj.object_name, terrain = name, "未知的地形名稱，已略過");
                        None
                    }
                }
            })
            .collect()
    }
}

/// 存檔目錄
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, save_name: &str) -> PathBuf {
        self.dir.join(format!("{save_name}.json"))
    }

    /// 寫入 `<dir>/<saveName>.json`，目錄不存在時自動建立
    pub fn save(&self, data: &SaveData) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(&data.save_name);
        let json = data.to_json()?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        info!(path = %path.display(), objects = data.objects.len(), "已儲存場次");
        Ok(path)
    }

    pub fn load(&self, save_name: &str) -> Result<SaveData> {
        let path = self.path_for(save_name);
        let json = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        SaveData::from_json(&json)
    }

    /// 所有存檔名稱（排序後）
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))? {
            let path = entry.map_err(|e| io_error(&self.dir, e))?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn io_error(path: &Path, error: std::io::Error) -> crate::error::Error {
    LoadError::Io {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_editor_json() {
        let json = r#"{
            "saveName": "ridge",
            "objects": [
                {
                    "objectName": "Tile(Clone)",
                    "position": {"x": 1.0, "y": 0.0, "z": 2.0},
                    "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
                    "terrainType": "Forest"
                },
                {
                    "objectName": "Tank",
                    "objectGivenName": "Alpha",
                    "position": {"x": 0.5, "y": 0.0, "z": 0.5},
                    "prefabName": "Tank",
                    "itemType": 1,
                    "team": "Blue",
                    "fatigue": 3
                },
                {
                    "objectName": "Tile(Clone)",
                    "position": {"x": 9.0, "y": 0.0, "z": 9.0},
                    "terrainType": "Lava"
                }
            ]
        }"#;

        let data = SaveData::from_json(json).unwrap();
        assert_eq!(data.save_name, "ridge");
        assert_eq!(data.objects.len(), 3);
        assert_eq!(data.objects[1].fatigue, 3);
        assert_eq!(data.objects[1].proficiency, 1);
        assert_eq!(data.objects[1].team.as_deref(), Some("Blue"));
        assert!(data.gaea_map_data.is_none());

        let tiles = data.terrain_tiles();
        assert_eq!(tiles, vec![(Vec3::new(1.0, 0.0, 2.0), TerrainType::Forest)]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(SaveData::from_json("{ not json").is_err());
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let mut data = SaveData::new("a");
        data.objects
            .push(ObjectData::terrain_tile("t", Vec3::ZERO, TerrainType::Snow));
        let json = data.to_json().unwrap();
        assert!(json.contains("\"saveName\""));
        assert!(json.contains("\"terrainType\": \"Snow\""));
        assert!(json.contains("\"commsClarity\""));
    }
}
