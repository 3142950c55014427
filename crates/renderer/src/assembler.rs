//! Scene ownership and the per-frame loop. Drawing is delegated to a [`RenderBackend`].

use crate::camera::{CameraController, CameraPose, OrbitCamera, OrbitSettings};
use engine_core::{prepare_model, AssetLoader, ModelRequest, SceneGraph};
use input::PointerEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,
    #[error("render backend failed: {0}")]
    Backend(String),
}

/// Whatever turns the scene and camera into pixels.
pub trait RenderBackend {
    fn render(&mut self, scene: &SceneGraph, camera: &OrbitCamera) -> Result<(), RenderError>;

    fn resize(&mut self, width: u32, height: u32);
}

/// Owns the generated scene, the camera and its controller.
#[derive(Debug)]
pub struct SceneAssembler {
    scene: SceneGraph,
    camera: OrbitCamera,
    controller: CameraController,
    /// Viewport change not yet forwarded to the backend.
    pending_resize: Option<(u32, u32)>,
    frames: u64,
}

impl SceneAssembler {
    pub fn new(scene: SceneGraph, settings: OrbitSettings, viewport: (u32, u32)) -> Self {
        let controller = CameraController::new(settings);
        let camera = OrbitCamera::new(controller.pose(), viewport.0, viewport.1);
        let stats = scene.stats();
        log::info!(
            "Scene ready: {} groups, {} meshes, {} lights",
            stats.groups,
            stats.meshes,
            stats.lights
        );
        Self {
            scene,
            camera,
            controller,
            pending_resize: Some(viewport),
            frames: 0,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Route one input event. Returns `true` when the host should suppress its default handling
    /// (page scrolling for wheel events).
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { x, y } => {
                self.controller.on_pointer_down(x, y);
                false
            }
            PointerEvent::Move { x, y } => {
                if self.controller.on_pointer_move(x, y) {
                    self.sync_camera();
                }
                false
            }
            PointerEvent::Up => {
                self.controller.on_pointer_up();
                false
            }
            PointerEvent::Wheel { delta_y } => {
                let suppress = self.controller.on_wheel(delta_y);
                self.sync_camera();
                suppress
            }
            PointerEvent::Resize { width, height } => {
                self.camera.set_aspect(width, height);
                self.pending_resize = Some((width, height));
                false
            }
        }
    }

    /// One frame: advance camera inertia, then draw. A failing backend is logged and the loop
    /// keeps going.
    pub fn frame(&mut self, backend: &mut dyn RenderBackend) {
        if let Some((width, height)) = self.pending_resize.take() {
            backend.resize(width, height);
        }
        if self.controller.tick() {
            self.sync_camera();
        }
        if let Err(e) = backend.render(&self.scene, &self.camera) {
            log::error!("Frame {} failed: {}", self.frames, e);
        }
        self.frames += 1;
    }

    /// Load an external model into the scene. Failures are logged and leave the scene as is.
    pub fn attach_model(&mut self, loader: &mut dyn AssetLoader, request: &ModelRequest) -> bool {
        match prepare_model(loader, request) {
            Ok(model) => {
                log::info!("Attached model {}", request.url);
                self.scene.add(model);
                true
            }
            Err(e) => {
                log::error!("Failed to load model: {}", e);
                false
            }
        }
    }

    fn sync_camera(&mut self) {
        self.camera.apply_pose(self.controller.pose());
    }
}

/// Backend that draws nothing and reports what it would draw.
#[derive(Debug, Default)]
pub struct LogBackend {
    reported_scene: bool,
    last_pose: Option<CameraPose>,
    viewport: (u32, u32),
    frames: u64,
}

impl LogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl RenderBackend for LogBackend {
    fn render(&mut self, scene: &SceneGraph, camera: &OrbitCamera) -> Result<(), RenderError> {
        if !self.reported_scene {
            let stats = scene.stats();
            log::info!(
                "Rendering {} root nodes ({} meshes, {} lights) on {} background",
                scene.nodes.len(),
                stats.meshes,
                stats.lights,
                scene.background
            );
            self.reported_scene = true;
        }

        let pose = CameraPose {
            position: camera.position(),
            target: camera.position() + camera.transform.forward(),
        };
        if self.last_pose.map_or(true, |last| last.position != pose.position) {
            log::debug!("Camera at {:?}", pose.position);
            self.last_pose = Some(pose);
        }
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Viewport {}x{}", width, height);
        self.viewport = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{
        AssetError, Color, GroupNode, Material, MeshNode, Primitive, SceneNode, TextureUrls, Vec3,
    };

    struct FailingBackend {
        calls: u32,
    }

    impl RenderBackend for FailingBackend {
        fn render(&mut self, _scene: &SceneGraph, _camera: &OrbitCamera) -> Result<(), RenderError> {
            self.calls += 1;
            Err(RenderError::SurfaceLost)
        }

        fn resize(&mut self, _width: u32, _height: u32) {}
    }

    struct CrateLoader;

    impl AssetLoader for CrateLoader {
        fn load_model(&mut self, url: &str) -> Result<SceneNode, AssetError> {
            if url.ends_with(".glb") {
                Ok(GroupNode::new(url)
                    .with_child(MeshNode::new(
                        "body",
                        Primitive::External {
                            source: url.to_string(),
                            mesh: 0,
                        },
                        Material::standard(Color::BLACK),
                    ))
                    .into())
            } else {
                Err(AssetError::Unsupported(url.to_string()))
            }
        }
    }

    fn assembler() -> SceneAssembler {
        SceneAssembler::new(SceneGraph::default(), OrbitSettings::default(), (800, 600))
    }

    #[test]
    fn wheel_is_suppressed_and_pointer_is_not() {
        let mut assembler = assembler();
        assert!(assembler.handle(PointerEvent::Wheel { delta_y: 100.0 }));
        assert!(!assembler.handle(PointerEvent::Down { x: 0.0, y: 0.0 }));
        assert!(!assembler.handle(PointerEvent::Up));
        assert!((assembler.controller().state().distance - 40.0).abs() < 1e-4);
    }

    #[test]
    fn resize_leaves_camera_orientation_alone() {
        let mut assembler = assembler();
        let state = *assembler.controller().state();
        let position = assembler.camera().position();
        assembler.handle(PointerEvent::Resize { width: 1024, height: 512 });
        assert_eq!(*assembler.controller().state(), state);
        assert_eq!(assembler.camera().position(), position);
        assert!((assembler.camera().aspect - 2.0).abs() < 1e-6);

        let mut backend = LogBackend::new();
        assembler.frame(&mut backend);
        assert_eq!(backend.viewport(), (1024, 512));
    }

    #[test]
    fn drag_moves_the_camera_and_frames_carry_momentum() {
        let mut assembler = assembler();
        let start = assembler.camera().position();
        assembler.handle(PointerEvent::Down { x: 0.0, y: 0.0 });
        assembler.handle(PointerEvent::Move { x: 40.0, y: 0.0 });
        assembler.handle(PointerEvent::Up);
        let released = assembler.camera().position();
        assert_ne!(start, released);

        let mut backend = LogBackend::new();
        assembler.frame(&mut backend);
        assert_ne!(assembler.camera().position(), released);
        assert_eq!(backend.frames(), 1);
    }

    #[test]
    fn backend_failure_does_not_stop_the_loop() {
        let mut assembler = assembler();
        let mut backend = FailingBackend { calls: 0 };
        assembler.frame(&mut backend);
        assembler.frame(&mut backend);
        assert_eq!(backend.calls, 2);
        assert_eq!(assembler.frames(), 2);
    }

    #[test]
    fn attached_model_is_restyled_and_placed() {
        let mut assembler = assembler();
        let request = ModelRequest {
            url: "models/blimp.glb".into(),
            textures: TextureUrls {
                diffuse_map_url: Some("blimp_diffuse.png".into()),
                emission_map_url: None,
            },
            placement: engine_core::ModelPlacement {
                position: Some(Vec3::new(0.0, 40.0, 0.0)),
                ..Default::default()
            },
        };
        assert!(assembler.attach_model(&mut CrateLoader, &request));
        let model = &assembler.scene().nodes[0];
        assert_eq!(model.transform().position, Vec3::new(0.0, 40.0, 0.0));
        let SceneNode::Mesh(body) = &model.children()[0] else { panic!("expected mesh") };
        assert_eq!(body.material.metalness, 1.0);
    }

    #[test]
    fn failed_model_leaves_scene_untouched() {
        let mut assembler = assembler();
        let request = ModelRequest {
            url: "models/blimp.fbx".into(),
            ..Default::default()
        };
        assert!(!assembler.attach_model(&mut CrateLoader, &request));
        assert!(assembler.scene().nodes.is_empty());
    }
}
