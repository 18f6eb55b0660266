//! Main-thread view of asset loads: typed handles and per-slot state.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AssetLoadError;
use crate::mesh::MeshData;
use crate::server::{AssetKind, AssetServer, LoadRequest, LoadedAsset};
use crate::texture::TextureData;

/// Typed reference to an asset slot.
pub struct Handle<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: u64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

/// Load state of one slot.
#[derive(Debug)]
pub enum AssetState<T> {
    Pending,
    Ready(Arc<T>),
    Failed(Arc<AssetLoadError>),
}

impl<T> Clone for AssetState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(v) => Self::Ready(Arc::clone(v)),
            Self::Failed(e) => Self::Failed(Arc::clone(e)),
        }
    }
}

impl<T> AssetState<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A slot that changed state during [`AssetStore::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    TextureReady(Handle<TextureData>),
    MeshReady(Handle<MeshData>),
    TextureFailed(Handle<TextureData>),
    MeshFailed(Handle<MeshData>),
}

/// Owns the worker pool and every slot it fills.
pub struct AssetStore {
    root: PathBuf,
    server: AssetServer,
    next_id: u64,
    by_path: HashMap<(AssetKind, PathBuf), u64>,
    textures: HashMap<u64, AssetState<TextureData>>,
    meshes: HashMap<u64, AssetState<MeshData>>,
}

impl AssetStore {
    /// Create a store that resolves relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>, worker_count: usize) -> Self {
        Self {
            root: root.into(),
            server: AssetServer::new(worker_count, 64),
            next_id: 1,
            by_path: HashMap::new(),
            textures: HashMap::new(),
            meshes: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Request a texture. The same path always maps to the same handle.
    pub fn load_texture(&mut self, relative: impl AsRef<Path>) -> Handle<TextureData> {
        let (id, fresh) = self.request(AssetKind::Texture, relative.as_ref());
        if let Some(state) = fresh {
            self.textures.insert(id, state);
        }
        Handle::new(id)
    }

    /// Request an OBJ model. The same path always maps to the same handle.
    pub fn load_model(&mut self, relative: impl AsRef<Path>) -> Handle<MeshData> {
        let (id, fresh) = self.request(AssetKind::Model, relative.as_ref());
        if let Some(state) = fresh {
            self.meshes.insert(id, state);
        }
        Handle::new(id)
    }

    /// Register an in-memory mesh; it is ready immediately.
    pub fn insert_mesh(&mut self, mesh: MeshData) -> Handle<MeshData> {
        let id = self.allocate();
        self.meshes.insert(id, AssetState::Ready(Arc::new(mesh)));
        Handle::new(id)
    }

    /// Returns the slot id and, for a new request, its initial state.
    fn request<T>(&mut self, kind: AssetKind, relative: &Path) -> (u64, Option<AssetState<T>>) {
        let path = self.root.join(relative);
        if let Some(&id) = self.by_path.get(&(kind, path.clone())) {
            return (id, None);
        }

        let id = self.allocate();
        self.by_path.insert((kind, path.clone()), id);
        log::debug!("Requesting {kind:?} {}", path.display());

        let state = match self.server.submit(LoadRequest { id, path, kind }) {
            Ok(()) => AssetState::Pending,
            Err(e) => {
                log::error!("Could not queue asset load: {e}");
                AssetState::Failed(Arc::new(e))
            }
        };
        (id, Some(state))
    }

    pub fn texture(&self, handle: Handle<TextureData>) -> AssetState<TextureData> {
        self.textures
            .get(&handle.id)
            .cloned()
            .unwrap_or(AssetState::Pending)
    }

    pub fn mesh(&self, handle: Handle<MeshData>) -> AssetState<MeshData> {
        self.meshes
            .get(&handle.id)
            .cloned()
            .unwrap_or(AssetState::Pending)
    }

    /// Slots still waiting on a worker.
    pub fn pending_count(&self) -> usize {
        self.textures.values().filter(|s| s.is_pending()).count()
            + self.meshes.values().filter(|s| s.is_pending()).count()
    }

    /// Collect finished loads. Called once per frame.
    pub fn poll(&mut self) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        for result in self.server.drain_results() {
            match result.asset {
                Ok(LoadedAsset::Texture(tex)) => {
                    self.textures
                        .insert(result.id, AssetState::Ready(Arc::new(tex)));
                    events.push(AssetEvent::TextureReady(Handle::new(result.id)));
                }
                Ok(LoadedAsset::Model(mesh)) => {
                    self.meshes
                        .insert(result.id, AssetState::Ready(Arc::new(mesh)));
                    events.push(AssetEvent::MeshReady(Handle::new(result.id)));
                }
                Err(e) => {
                    log::warn!("Asset {} failed to load: {e}", result.path.display());
                    let error = Arc::new(e);
                    if self.textures.contains_key(&result.id) {
                        self.textures
                            .insert(result.id, AssetState::Failed(error));
                        events.push(AssetEvent::TextureFailed(Handle::new(result.id)));
                    } else {
                        self.meshes.insert(result.id, AssetState::Failed(error));
                        events.push(AssetEvent::MeshFailed(Handle::new(result.id)));
                    }
                }
            }
        }
        events
    }
}
