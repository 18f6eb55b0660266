//! Scene graph and the scene variants built on it.
//!
//! [`Scene::build`] turns a [`Config`](orrery_config::Config) into a graph of
//! lights, meshes, and orbiting bodies. Each frame the host calls
//! [`Scene::resolve_assets`] and [`Scene::animate`], then draws
//! [`SceneGraph::draw_list`].

mod body;
mod error;
pub mod graph;
mod scene;

pub use body::CelestialBody;
pub use error::SceneError;
pub use graph::{
    DrawItem, Lighting, Material, Node, NodeId, NodeKind, SceneGraph, Shading, Transform,
};
pub use scene::{CameraSetup, Scene, StarField, StarFieldStatus};
