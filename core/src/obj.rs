//! Wavefront OBJ 地形模型解析
//!
//! 只處理 `v`、`vt`、`vn`、`f` 四種記錄。座標轉為左手系（z 反轉），
//! 頂點縮放 0.01，UV 的 v 翻轉。每個面展開為不共用頂點的三角形，
//! 並反轉繞序以配合座標翻轉。

use crate::error::{LoadError, Result};
use glam::{Vec2, Vec3};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// 匯入時的頂點縮放
pub const OBJ_VERTEX_SCALE: f32 = 0.01;

const TRIANGLE_ORDER: [usize; 3] = [0, 2, 1];
const QUAD_ORDER: [usize; 6] = [0, 2, 1, 0, 3, 2];

/// 展開後的三角網格，三個陣列長度相同
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<u32>,
}

impl ObjMesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// 面的單一角：頂點 / UV / 法線索引（皆為 0 起算）
#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// 讀取並解析 OBJ 檔案
pub fn load_obj(path: &Path) -> Result<ObjMesh> {
    let source = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mesh = parse_obj(&source)?;
    info!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        "已載入 OBJ 模型"
    );
    Ok(mesh)
}

/// 解析 OBJ 文字
pub fn parse_obj(source: &str) -> Result<ObjMesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();
    let mut face_normals: Vec<Vec3> = Vec::new();
    let mut mesh = ObjMesh::default();

    for (line_index, raw) in source.lines().enumerate() {
        let line_no = line_index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&args, line_no)?;
                positions.push(Vec3::new(x, y, -z) * OBJ_VERTEX_SCALE);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&args, line_no)?;
                tex_coords.push(Vec2::new(u, 1.0 - v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&args, line_no)?;
                face_normals.push(Vec3::new(x, y, -z));
            }
            "f" => {
                let corners = args
                    .iter()
                    .map(|arg| parse_corner(arg, line_no))
                    .collect::<Result<Vec<_>>>()?;
                let order: &[usize] = match corners.len() {
                    3 => &TRIANGLE_ORDER,
                    4 => &QUAD_ORDER,
                    n => {
                        debug!(line = line_no, corners = n, "略過非三角形/四邊形的面");
                        continue;
                    }
                };
                for &i in order {
                    let corner = corners[i];
                    let vertex = lookup(&positions, corner.vertex, "頂點", line_no)?;
                    let uv = match corner.uv {
                        Some(index) => lookup(&tex_coords, index, "UV", line_no)?,
                        None => Vec2::ZERO,
                    };
                    let normal = match corner.normal {
                        Some(index) => lookup(&face_normals, index, "法線", line_no)?,
                        None => Vec3::Y,
                    };
                    mesh.triangles.push(mesh.vertices.len() as u32);
                    mesh.vertices.push(vertex);
                    mesh.uvs.push(uv);
                    mesh.normals.push(normal);
                }
            }
            _ => {}
        }
    }

    if mesh.triangles.is_empty() {
        return Err(LoadError::EmptyMesh.into());
    }
    Ok(mesh)
}

fn parse_floats<const N: usize>(args: &[&str], line: usize) -> Result<[f32; N]> {
    if args.len() < N {
        return Err(LoadError::ParseError {
            line,
            reason: format!("需要 {} 個數值，只有 {} 個", N, args.len()),
        }
        .into());
    }
    let mut values = [0.0; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg.parse().map_err(|_| LoadError::ParseError {
            line,
            reason: format!("無法解析數值: {arg}"),
        })?;
    }
    Ok(values)
}

// `v`、`v/vt`、`v//vn`、`v/vt/vn`
fn parse_corner(arg: &str, line: usize) -> Result<Corner> {
    let mut fields = arg.split('/');
    let vertex = fields
        .next()
        .map(|f| parse_index(f, line))
        .transpose()?
        .flatten()
        .ok_or_else(|| LoadError::ParseError {
            line,
            reason: format!("面缺少頂點索引: {arg}"),
        })?;
    let uv = fields.next().map(|f| parse_index(f, line)).transpose()?.flatten();
    let normal = fields.next().map(|f| parse_index(f, line)).transpose()?.flatten();
    Ok(Corner { vertex, uv, normal })
}

fn parse_index(field: &str, line: usize) -> Result<Option<usize>> {
    if field.is_empty() {
        return Ok(None);
    }
    let index: usize = field.parse().map_err(|_| LoadError::ParseError {
        line,
        reason: format!("無效的索引: {field}"),
    })?;
    if index == 0 {
        return Err(LoadError::ParseError {
            line,
            reason: "OBJ 索引從 1 開始".to_string(),
        }
        .into());
    }
    Ok(Some(index - 1))
}

fn lookup<T: Copy>(items: &[T], index: usize, what: &str, line: usize) -> Result<T> {
    items.get(index).copied().ok_or_else(|| {
        LoadError::ParseError {
            line,
            reason: format!("{what}索引超出範圍: {}", index + 1),
        }
        .into()
    })
}
