//! Bodies that follow a circular orbit every frame.

use glam::{DVec3, Vec3};
use orrery_assets::{Handle, MeshData};
use orrery_config::BodyConfig;
use orrery_space::{CircularOrbit, OrbitalPeriod};

use crate::error::SceneError;
use crate::graph::{Material, NodeId, NodeKind, SceneGraph, Transform};

/// A sphere on a circular orbit, drawn by one scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub radius: f32,
    pub node: NodeId,
    pub orbit: CircularOrbit,
}

impl CelestialBody {
    /// Validate the orbit and add the body's node to `graph`.
    ///
    /// `center` is the orbit centre; the body sits at its height.
    pub fn spawn(
        graph: &mut SceneGraph,
        config: &BodyConfig,
        center: Vec3,
        mesh: Handle<MeshData>,
        material: Material,
    ) -> Result<Self, SceneError> {
        let period =
            OrbitalPeriod::new(config.period_s).map_err(|source| SceneError::InvalidOrbit {
                name: config.name.clone(),
                source,
            })?;
        let orbit = CircularOrbit::new(config.orbit_radius, period, center.as_dvec3());

        let start = orbit.position_at(0.0, center.y as f64).as_vec3();
        let node = graph.add(
            config.name.clone(),
            NodeKind::Mesh { mesh, material },
            Transform::from_translation(start).with_scale(config.radius),
            None,
        );

        Ok(Self {
            name: config.name.clone(),
            radius: config.radius,
            node,
            orbit,
        })
    }

    /// Move the body to its orbital position at `elapsed` seconds.
    pub fn update(&self, elapsed: f64, graph: &mut SceneGraph) {
        if let Some(node) = graph.get_mut(self.node) {
            self.orbit.apply(elapsed, &mut node.transform.translation);
        }
    }

    pub fn position(&self, graph: &SceneGraph) -> Vec3 {
        graph
            .get(self.node)
            .map(|n| n.transform.translation)
            .unwrap_or(self.orbit.center.as_vec3())
    }

    pub fn center(&self) -> DVec3 {
        self.orbit.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_assets::AssetStore;

    fn config(period_s: f64) -> BodyConfig {
        BodyConfig {
            name: "earth".to_string(),
            radius: 0.3,
            texture: None,
            color: [1.0; 3],
            orbit_radius: 6.0,
            period_s,
        }
    }

    #[test]
    fn test_spawn_places_on_orbit() {
        let mut store = AssetStore::new("unused", 0);
        let mesh = store.insert_mesh(orrery_assets::uv_sphere(4, 3));
        let mut graph = SceneGraph::new();
        let body = CelestialBody::spawn(
            &mut graph,
            &config(3.0),
            Vec3::ZERO,
            mesh,
            Material::lambert([1.0; 3]),
        )
        .unwrap();
        assert!((body.position(&graph) - Vec3::new(6.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(graph.get(body.node).unwrap().transform.scale, Vec3::splat(0.3));
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let mut store = AssetStore::new("unused", 0);
        let mesh = store.insert_mesh(orrery_assets::uv_sphere(4, 3));
        let mut graph = SceneGraph::new();
        let err = CelestialBody::spawn(
            &mut graph,
            &config(0.0),
            Vec3::ZERO,
            mesh,
            Material::lambert([1.0; 3]),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::InvalidOrbit { ref name, .. } if name == "earth"));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_update_orbits_around_center() {
        let mut store = AssetStore::new("unused", 0);
        let mesh = store.insert_mesh(orrery_assets::uv_sphere(4, 3));
        let mut graph = SceneGraph::new();
        let center = Vec3::new(2.0, 1.0, -4.0);
        let body = CelestialBody::spawn(
            &mut graph,
            &config(1.0),
            center,
            mesh,
            Material::lambert([1.0; 3]),
        )
        .unwrap();

        body.update(std::f64::consts::FRAC_PI_2, &mut graph);
        let p = body.position(&graph);
        assert!((p - Vec3::new(2.0, 1.0, 2.0)).length() < 1e-4, "{p}");
    }
}
