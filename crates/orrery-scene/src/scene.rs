//! Scene assembly for each variant, plus per-frame animation.

use glam::{Quat, Vec3};
use orrery_assets::{AssetState, AssetStore, Handle, MeshData, uv_sphere};
use orrery_config::{Config, SceneVariant, StarConfig};
use orrery_space::{BoundedOscillator, ScatterBounds, StarPlacement, StarScatterer};

use crate::body::CelestialBody;
use crate::error::SceneError;
use crate::graph::{Material, NodeId, NodeKind, SceneGraph, Transform};

const SPHERE_SEGMENTS: u32 = 32;
const STAR_SEGMENTS: (u32, u32) = (8, 6);

/// Where the camera starts and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSetup {
    pub position: Vec3,
    pub target: Vec3,
}

/// Progress of the star field toward being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFieldStatus {
    /// Waiting on the star mesh.
    AwaitingMesh,
    /// Placed this many stars.
    Placed(usize),
    /// Mesh failed to load or placement timed out; the scene runs without stars.
    Abandoned,
}

/// Stars scattered around an anchor, slowly spinning about it.
#[derive(Debug, Clone)]
pub struct StarField {
    group: NodeId,
    mesh: Handle<MeshData>,
    material: Material,
    scatterer: StarScatterer,
    seed: Option<u64>,
    spin: f32,
    angle: f32,
    status: StarFieldStatus,
}

impl StarField {
    fn new(
        graph: &mut SceneGraph,
        assets: &mut AssetStore,
        config: &StarConfig,
        anchor: Vec3,
    ) -> Result<Self, SceneError> {
        let bounds = ScatterBounds {
            max_radius: config.max_radius,
            vertical_min: config.vertical_min,
            vertical_max: config.vertical_max,
            scale_min: config.scale_min,
            scale_max: config.scale_max,
        };
        let scatterer =
            StarScatterer::new(anchor, config.count as usize, config.min_distance, bounds)?
                .with_max_attempts(config.max_attempts)?;

        let mesh = match &config.model {
            Some(path) => assets.load_model(path),
            None => assets.insert_mesh(uv_sphere(STAR_SEGMENTS.0, STAR_SEGMENTS.1)),
        };

        let group = graph.add(
            "stars",
            NodeKind::Group,
            Transform::from_translation(anchor),
            None,
        );

        Ok(Self {
            group,
            mesh,
            material: Material::unlit(config.color),
            scatterer,
            seed: config.seed,
            spin: config.spin,
            angle: 0.0,
            status: StarFieldStatus::AwaitingMesh,
        })
    }

    pub fn status(&self) -> StarFieldStatus {
        self.status
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn mesh(&self) -> Handle<MeshData> {
        self.mesh
    }

    /// Current spin angle about the anchor, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    fn place(&self) -> Result<Vec<StarPlacement>, orrery_space::ScatterError> {
        match self.seed {
            Some(seed) => self.scatterer.scatter_seeded(seed),
            None => self.scatterer.scatter(&mut rand::rng()),
        }
    }

    /// Scatter and attach the stars once the mesh is ready.
    fn resolve(&mut self, graph: &mut SceneGraph, assets: &AssetStore) {
        if self.status != StarFieldStatus::AwaitingMesh {
            return;
        }
        match assets.mesh(self.mesh) {
            AssetState::Pending => {}
            AssetState::Failed(e) => {
                tracing::warn!("Star mesh unavailable, running without stars: {e}");
                self.status = StarFieldStatus::Abandoned;
            }
            AssetState::Ready(_) => match self.place() {
                Ok(placements) => {
                    let anchor = self.scatterer.anchor();
                    let instances: Vec<Transform> = placements
                        .iter()
                        .map(|s| {
                            Transform::from_translation(s.position - anchor)
                                .with_scale(s.scale)
                                .with_rotation_y(s.rotation)
                        })
                        .collect();
                    let count = instances.len();
                    graph.add(
                        "star-instances",
                        NodeKind::InstancedMesh {
                            mesh: self.mesh,
                            material: self.material,
                            instances,
                        },
                        Transform::IDENTITY,
                        Some(self.group),
                    );
                    tracing::info!("Placed {count} stars");
                    self.status = StarFieldStatus::Placed(count);
                }
                Err(e) => {
                    tracing::warn!("Star placement abandoned: {e}");
                    self.status = StarFieldStatus::Abandoned;
                }
            },
        }
    }

    fn spin(&mut self, dt: f32, graph: &mut SceneGraph) {
        self.angle = (self.angle + self.spin * dt).rem_euclid(std::f32::consts::TAU);
        if let Some(node) = graph.get_mut(self.group) {
            node.transform.rotation = Quat::from_rotation_y(self.angle);
        }
    }
}

/// The model that rocks back and forth about its vertical axis.
#[derive(Debug, Clone)]
struct Primary {
    node: NodeId,
    oscillator: BoundedOscillator,
}

/// A built scene and everything that animates it.
#[derive(Debug, Clone)]
pub struct Scene {
    pub variant: SceneVariant,
    pub graph: SceneGraph,
    pub bodies: Vec<CelestialBody>,
    pub background: [f32; 3],
    pub camera: CameraSetup,
    primary: Option<Primary>,
    star_field: Option<StarField>,
    oscillation_rate: f32,
}

impl Scene {
    /// Build the configured variant. Asset loads are queued on `assets`;
    /// nodes that depend on them draw once the loads resolve.
    pub fn build(config: &Config, assets: &mut AssetStore) -> Result<Self, SceneError> {
        let mut scene = Self {
            variant: config.scene.variant,
            graph: SceneGraph::new(),
            bodies: Vec::new(),
            background: config.scene.background,
            camera: CameraSetup {
                position: Vec3::from(config.solar.camera_position),
                target: Vec3::ZERO,
            },
            primary: None,
            star_field: None,
            oscillation_rate: 1.0,
        };

        scene.add_lights(config);
        match config.scene.variant {
            SceneVariant::SolarSystem => scene.build_solar_system(config, assets)?,
            SceneVariant::BunnyStars => scene.build_bunny_stars(config, assets, false)?,
            SceneVariant::BunnyStarsPlanet => scene.build_bunny_stars(config, assets, true)?,
        }

        tracing::info!(
            "Built {} scene: {} nodes, {} orbiting bodies",
            scene.variant.name(),
            scene.graph.len(),
            scene.bodies.len()
        );
        Ok(scene)
    }

    fn add_lights(&mut self, config: &Config) {
        self.graph.add(
            "ambient-light",
            NodeKind::AmbientLight {
                color: config.solar.ambient_color,
            },
            Transform::IDENTITY,
            None,
        );
        self.graph.add(
            "directional-light",
            NodeKind::DirectionalLight {
                color: config.solar.light_color,
                intensity: config.solar.light_intensity,
            },
            Transform::from_translation(Vec3::from(config.solar.light_position)),
            None,
        );
    }

    fn build_solar_system(
        &mut self,
        config: &Config,
        assets: &mut AssetStore,
    ) -> Result<(), SceneError> {
        let solar = &config.solar;
        let sphere = assets.insert_mesh(uv_sphere(SPHERE_SEGMENTS, SPHERE_SEGMENTS));

        let sun_texture = solar.sun_texture.as_ref().map(|t| assets.load_texture(t));
        self.graph.add(
            "sun",
            NodeKind::Mesh {
                mesh: sphere,
                material: Material::unlit([1.0; 3]).with_texture(sun_texture),
            },
            Transform::IDENTITY.with_scale(solar.sun_radius),
            None,
        );

        for planet in &solar.planets {
            let texture = planet.texture.as_ref().map(|t| assets.load_texture(t));
            let body = CelestialBody::spawn(
                &mut self.graph,
                planet,
                Vec3::ZERO,
                sphere,
                Material::lambert(planet.color).with_texture(texture),
            )?;
            self.bodies.push(body);
        }
        Ok(())
    }

    fn build_bunny_stars(
        &mut self,
        config: &Config,
        assets: &mut AssetStore,
        with_planet: bool,
    ) -> Result<(), SceneError> {
        let bunny = &config.bunny;
        let anchor = Vec3::from(bunny.position);

        let model = assets.load_model(&bunny.model);
        let node = self.graph.add(
            "bunny",
            NodeKind::Mesh {
                mesh: model,
                material: Material::lambert(bunny.color),
            },
            Transform::from_translation(anchor).with_scale(bunny.scale),
            None,
        );
        self.primary = Some(Primary {
            node,
            oscillator: BoundedOscillator::new(bunny.oscillation_step, bunny.oscillation_limit),
        });

        self.star_field = Some(StarField::new(
            &mut self.graph,
            assets,
            &config.stars,
            anchor,
        )?);

        if with_planet {
            let sphere = assets.insert_mesh(uv_sphere(SPHERE_SEGMENTS, SPHERE_SEGMENTS));
            let texture = bunny.planet.texture.as_ref().map(|t| assets.load_texture(t));
            let body = CelestialBody::spawn(
                &mut self.graph,
                &bunny.planet,
                anchor,
                sphere,
                Material::lambert(bunny.planet.color).with_texture(texture),
            )?;
            self.bodies.push(body);
        }

        self.camera = CameraSetup {
            position: Vec3::from(bunny.camera_position),
            target: anchor,
        };
        Ok(())
    }

    /// Attach anything whose assets finished loading. Called once per frame.
    pub fn resolve_assets(&mut self, assets: &AssetStore) {
        if let Some(stars) = &mut self.star_field {
            stars.resolve(&mut self.graph, assets);
        }
    }

    /// Advance time-driven state.
    ///
    /// Orbits are a function of `elapsed` alone. The oscillation advances
    /// [`set_oscillation_rate`](Self::set_oscillation_rate) steps per call
    /// (one by default). The star field spins by `dt`.
    pub fn animate(&mut self, elapsed: f64, dt: f32) {
        for body in &self.bodies {
            body.update(elapsed, &mut self.graph);
        }

        if let Some(primary) = &mut self.primary {
            let angle = primary.oscillator.advance_scaled(self.oscillation_rate);
            if let Some(node) = self.graph.get_mut(primary.node) {
                node.transform.rotation = Quat::from_rotation_y(angle);
            }
        }

        if let Some(stars) = &mut self.star_field {
            stars.spin(dt, &mut self.graph);
        }
    }

    pub fn star_field(&self) -> Option<&StarField> {
        self.star_field.as_ref()
    }

    /// Number of stars currently in the scene.
    pub fn star_count(&self) -> usize {
        match self.star_field.as_ref().map(|s| s.status) {
            Some(StarFieldStatus::Placed(n)) => n,
            _ => 0,
        }
    }

    /// Current rotation of the oscillating model, if the scene has one.
    pub fn primary_angle(&self) -> Option<f32> {
        self.primary.as_ref().map(|p| p.oscillator.angle())
    }

    pub fn body(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn set_oscillation_step(&mut self, step: f32) {
        if let Some(primary) = &mut self.primary {
            primary.oscillator.set_step_magnitude(step);
        }
    }

    /// Oscillation steps taken per [`animate`](Self::animate) call. Zero
    /// pauses the sweep.
    pub fn set_oscillation_rate(&mut self, rate: f32) {
        self.oscillation_rate = rate.max(0.0);
    }

    pub fn set_star_spin(&mut self, spin: f32) {
        if let Some(stars) = &mut self.star_field {
            stars.spin = spin;
        }
    }
}
