use crate::cube_camera::CubeCamera;
use lumen_common::NodeId;
use lumen_render::{Capabilities, CubeFace, CubeRenderTarget, RenderError, Renderer};
use lumen_scene::{Environment, SceneError, SceneGraph, TextureId};
use serde::{Deserialize, Serialize};

/// Errors from capture operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("capturer is idle; activate it before capturing")]
    NotActive,
    #[error("cube resolution {resolution} is not supported by the renderer")]
    UnsupportedResolution { resolution: u32 },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// How often `capture` actually re-renders the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePolicy {
    #[default]
    EveryFrame,
    /// Capture on the first call and then on every `n`th; `0` behaves like `1`.
    EveryNth(u32),
}

impl CapturePolicy {
    fn should_capture(self, call: u64) -> bool {
        match self {
            Self::EveryFrame => true,
            Self::EveryNth(n) => call % u64::from(n.max(1)) == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// All six faces were rendered during `frame`.
    Captured { frame: u64 },
    /// The policy skipped this call; the published cube keeps its contents.
    Skipped,
}

#[derive(Debug)]
struct Active {
    target: CubeRenderTarget,
    reflective: NodeId,
    calls: u64,
}

/// Keeps a live cube map of the scene around a reflective node.
#[derive(Debug)]
pub struct ReflectionCapturer {
    resolution: u32,
    policy: CapturePolicy,
    camera: CubeCamera,
    active: Option<Active>,
    captures: u64,
}

impl ReflectionCapturer {
    /// Idle capturer; nothing is allocated until `activate`.
    pub fn new(resolution: u32, policy: CapturePolicy) -> Self {
        Self {
            resolution,
            policy,
            camera: CubeCamera::default(),
            active: None,
            captures: 0,
        }
    }

    pub fn with_camera(mut self, camera: CubeCamera) -> Self {
        self.camera = camera;
        self
    }

    pub fn state(&self) -> CaptureState {
        match self.active {
            Some(_) => CaptureState::Active,
            None => CaptureState::Idle,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn policy(&self) -> CapturePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CapturePolicy) {
        self.policy = policy;
    }

    pub fn camera(&self) -> &CubeCamera {
        &self.camera
    }

    pub fn capture_layers(&self) -> lumen_common::LayerMask {
        self.camera.capture_layers()
    }

    /// Texture the capturer publishes, once active.
    pub fn texture(&self) -> Option<TextureId> {
        self.active.as_ref().map(|a| a.target.texture())
    }

    pub fn reflective(&self) -> Option<NodeId> {
        self.active.as_ref().map(|a| a.reflective)
    }

    /// Number of completed six-face captures.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// Idle → Active: allocate the target and publish it as the scene
    /// environment. A second call leaves the existing target in place.
    pub fn activate(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut SceneGraph,
        reflective: NodeId,
    ) -> Result<TextureId, CaptureError> {
        if let Some(active) = &self.active {
            return Ok(active.target.texture());
        }
        if scene.get(reflective).is_none() {
            return Err(SceneError::UnknownNode(reflective).into());
        }
        check_resolution(renderer.capabilities(), self.resolution)?;
        let target = renderer.create_cube_target(self.resolution)?;
        let texture = target.texture();
        scene.set_environment(Some(Environment::Cube(texture)));
        tracing::info!(
            texture = texture.0,
            resolution = self.resolution,
            reflective = %reflective.short(),
            "reflection capture active"
        );
        self.active = Some(Active {
            target,
            reflective,
            calls: 0,
        });
        Ok(texture)
    }

    /// Re-render the cube from the reflective node's current position.
    ///
    /// Call after the frame's transform updates and before its main render.
    /// The faces see the environment published by the previous capture.
    pub fn capture(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut SceneGraph,
    ) -> Result<CaptureOutcome, CaptureError> {
        let active = self.active.as_mut().ok_or(CaptureError::NotActive)?;
        let call = active.calls;
        active.calls += 1;
        if !self.policy.should_capture(call) {
            tracing::trace!(call, "capture skipped by policy");
            return Ok(CaptureOutcome::Skipped);
        }

        let texture = active.target.texture();
        if scene.environment() != Some(&Environment::Cube(texture)) {
            tracing::debug!(texture = texture.0, "republishing capture environment");
            scene.set_environment(Some(Environment::Cube(texture)));
        }

        let position = scene
            .world_position(active.reflective)
            .ok_or(SceneError::UnknownNode(active.reflective))?;
        self.camera.set_position(position);

        let frame = renderer.current_frame();
        let _span = tracing::info_span!("capture", frame).entered();
        for face in CubeFace::ALL {
            renderer.render_cube_face(scene, &self.camera.face_camera(face), &active.target, face)?;
            tracing::debug!(face = face.label(), "face captured");
        }
        self.captures += 1;
        Ok(CaptureOutcome::Captured { frame })
    }

    /// Change the cube resolution. Reallocates only when `resolution` differs;
    /// returns whether it did. The new texture replaces the old one as the
    /// scene environment, and the next `capture` renders it regardless of
    /// policy so an empty cube is never sampled by a main pass.
    pub fn set_resolution(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut SceneGraph,
        resolution: u32,
    ) -> Result<bool, CaptureError> {
        if resolution == self.resolution {
            return Ok(false);
        }
        check_resolution(renderer.capabilities(), resolution)?;
        if let Some(active) = self.active.as_mut() {
            let target = renderer.create_cube_target(resolution)?;
            let texture = target.texture();
            let old = std::mem::replace(&mut active.target, target);
            renderer.dispose_cube_target(old);
            active.calls = 0;
            scene.set_environment(Some(Environment::Cube(texture)));
            tracing::info!(texture = texture.0, resolution, "capture target reallocated");
        }
        self.resolution = resolution;
        Ok(true)
    }
}

fn check_resolution(caps: Capabilities, resolution: u32) -> Result<(), CaptureError> {
    let unsupported = resolution == 0
        || resolution > caps.max_cube_resolution
        || (caps.power_of_two_cube_targets && !resolution.is_power_of_two());
    if unsupported {
        tracing::warn!(resolution, "unsupported cube resolution");
        return Err(CaptureError::UnsupportedResolution { resolution });
    }
    Ok(())
}
