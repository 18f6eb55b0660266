//! Asset loading for textures and OBJ models.
//!
//! Files are decoded on a small worker pool. The main thread requests an asset
//! and immediately gets a typed [`Handle`]; the slot stays
//! [`AssetState::Pending`] until [`AssetStore::poll`] collects the worker's
//! result and flips it to `Ready` or `Failed`.

mod error;
pub mod mesh;
pub mod model;
mod server;
mod store;
pub mod texture;

pub use error::AssetLoadError;
pub use mesh::{MeshData, uv_sphere};
pub use model::load_obj;
pub use server::{AssetKind, AssetServer, LoadRequest, LoadResult, LoadedAsset};
pub use store::{AssetEvent, AssetState, AssetStore, Handle};
pub use texture::{TextureData, load_texture};
