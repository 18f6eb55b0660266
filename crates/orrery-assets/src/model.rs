//! OBJ model loading via `tobj`.

use std::path::Path;

use crate::error::AssetLoadError;
use crate::mesh::MeshData;

/// Load every object in an OBJ file and merge them into one mesh.
///
/// Missing normals are computed; missing UVs are zero. Material libraries are
/// ignored.
pub fn load_obj(path: &Path) -> Result<MeshData, AssetLoadError> {
    std::fs::metadata(path).map_err(|source| AssetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (models, _materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| AssetLoadError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut merged = MeshData::default();
    for model in &models {
        let part = convert_mesh(&model.mesh);
        log::debug!(
            "OBJ object '{}': {} vertices, {} triangles",
            model.name,
            part.vertex_count(),
            part.triangle_count()
        );
        merged.append(&part);
    }

    if merged.is_empty() {
        return Err(AssetLoadError::EmptyModel(path.to_path_buf()));
    }

    log::info!(
        "Loaded model {} ({} vertices, {} triangles)",
        path.display(),
        merged.vertex_count(),
        merged.triangle_count()
    );
    Ok(merged)
}

fn convert_mesh(mesh: &tobj::Mesh) -> MeshData {
    let vertex_count = mesh.positions.len() / 3;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    // OBJ texture V points up; textures are stored top row first.
    let uvs: Vec<[f32; 2]> = if mesh.texcoords.len() / 2 == vertex_count {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], 1.0 - t[1]])
            .collect()
    } else {
        vec![[0.0, 0.0]; vertex_count]
    };

    let mut data = MeshData {
        positions,
        normals: Vec::new(),
        uvs,
        indices: mesh.indices.clone(),
    };

    if mesh.normals.len() / 3 == vertex_count && vertex_count > 0 {
        data.normals = mesh
            .normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect();
    } else {
        data.compute_normals();
    }
    data
}
