use crate::clock::Clock;
use crate::event::HostEvent;
use crate::panels;
use crate::viewport::Viewport;
use lumen_assets::AssetLoader;
use lumen_capture::{CaptureError, CaptureOutcome, ReflectionCapturer};
use lumen_compose::{ComposeError, DemoConfig, SceneComposer, composer_for};
use lumen_render::{OrderingViolation, PerspectiveCamera, RenderError, Renderer};
use lumen_scene::{SceneError, SceneGraph};
use lumen_tools::{DebugPanel, PanelError, PanelValue};
use std::time::Duration;

/// Errors surfaced to the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("scene composition failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("reflection capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("scene update failed: {0}")]
    Scene(#[from] SceneError),
    #[error("debug panel: {0}")]
    Panel(#[from] PanelError),
}

/// Everything the per-frame work and the debug panel act on.
pub struct DemoState {
    pub config: DemoConfig,
    pub composer: Box<dyn SceneComposer>,
    pub scene: SceneGraph,
    pub renderer: Box<dyn Renderer>,
    pub camera: PerspectiveCamera,
    pub capturer: Option<ReflectionCapturer>,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub elapsed: f32,
    /// `None` when the scene has no reflective node.
    pub capture: Option<CaptureOutcome>,
    pub scene_revision: u64,
}

/// Drives a composed scene: advance, then capture, then the main render.
pub struct FrameLoop {
    state: DemoState,
    panel: DebugPanel<DemoState>,
    viewport: Viewport,
    clock: Clock,
}

impl FrameLoop {
    /// Build the configured scene, size the renderer and activate reflection
    /// capture when the scene has a reflective node.
    pub fn new(
        config: DemoConfig,
        mut renderer: Box<dyn Renderer>,
        loader: &mut dyn AssetLoader,
    ) -> Result<Self, HostError> {
        let mut composer = composer_for(&config);
        let mut scene = composer.build_scene(loader)?;
        let viewport = Viewport::from(config.viewport);
        let mut camera = composer.main_camera(viewport.aspect());

        composer.configure(renderer.settings_mut());
        viewport.apply(&mut camera, renderer.as_mut());
        composer.set_pixel_ratio(&mut scene, viewport.pixel_ratio())?;

        let capturer = match composer.reflective_node() {
            Some(node) => {
                let mut capturer = ReflectionCapturer::new(config.cube_resolution, config.capture_policy);
                capturer.activate(renderer.as_mut(), &mut scene, node)?;
                Some(capturer)
            }
            None => None,
        };

        let panel = panels::build(config.scene, &scene)?;
        tracing::info!(
            scene = composer.name(),
            nodes = scene.node_count(),
            width = viewport.width(),
            height = viewport.height(),
            capture = capturer.is_some(),
            "frame loop ready"
        );

        Ok(Self {
            state: DemoState {
                config,
                composer,
                scene,
                renderer,
                camera,
                capturer,
            },
            panel,
            viewport,
            clock: Clock::new(),
        })
    }

    /// Run one frame at host time `now`.
    pub fn tick(&mut self, now: Duration) -> Result<FrameReport, HostError> {
        let state = &mut self.state;
        let frame = state.renderer.begin_frame();
        let elapsed = self.clock.elapsed(now);
        let _span = tracing::debug_span!("tick", frame, elapsed).entered();

        state.composer.advance(&mut state.scene, elapsed)?;
        let capture = match state.capturer.as_mut() {
            Some(capturer) => Some(capturer.capture(state.renderer.as_mut(), &mut state.scene)?),
            None => None,
        };
        state.renderer.render(&state.scene, &state.camera)?;

        Ok(FrameReport {
            frame,
            elapsed,
            capture,
            scene_revision: state.scene.revision(),
        })
    }

    /// Apply a host event. Takes effect at the next tick.
    pub fn handle(&mut self, event: HostEvent) -> Result<(), HostError> {
        match event {
            HostEvent::Resize {
                width,
                height,
                device_pixel_ratio,
            } => {
                if self.viewport.resize(width, height, device_pixel_ratio) {
                    tracing::debug!(width, height, device_pixel_ratio, "viewport resized");
                }
                let state = &mut self.state;
                self.viewport.apply(&mut state.camera, state.renderer.as_mut());
                state.composer.set_pixel_ratio(&mut state.scene, self.viewport.pixel_ratio())?;
            }
            HostEvent::PanelInput { control, value } => {
                self.panel.set_from_str(&mut self.state, &control, &value)?;
            }
        }
        Ok(())
    }

    /// Set a debug panel control directly.
    pub fn set_control(&mut self, name: &str, value: PanelValue) -> Result<PanelValue, HostError> {
        Ok(self.panel.set(&mut self.state, name, value)?)
    }

    pub fn control(&self, name: &str) -> Result<PanelValue, HostError> {
        Ok(self.panel.get(&self.state, name)?)
    }

    /// Every panel control with its current value.
    pub fn controls(&self) -> Vec<(String, PanelValue)> {
        self.panel.snapshot(&self.state)
    }

    /// Check capture-before-main ordering for `frame`. Frames without
    /// capture pass trivially.
    pub fn verify_frame(&self, frame: u64) -> Result<(), OrderingViolation> {
        let Some(texture) = self.state.capturer.as_ref().and_then(|c| c.texture()) else {
            return Ok(());
        };
        self.state.renderer.frame_log().check_capture_order(frame, texture)
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.state.scene
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.state.renderer.as_ref()
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.state.camera
    }

    pub fn capturer(&self) -> Option<&ReflectionCapturer> {
        self.state.capturer.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn panel_title(&self) -> &str {
        self.panel.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_capture::CapturePolicy;
    use lumen_compose::{DemoScene, builtin_assets};
    use lumen_render::{PassKind, SoftwareRenderer, ToneMapping};
    use lumen_scene::UniformValue;

    fn small_config(scene: DemoScene) -> DemoConfig {
        let mut config = DemoConfig {
            scene,
            cube_resolution: 8,
            fireflies_count: 6,
            helmet: false,
            ..DemoConfig::default()
        };
        config.viewport.width = 24;
        config.viewport.height = 16;
        config
    }

    fn frame_loop(config: DemoConfig) -> FrameLoop {
        let renderer = Box::new(SoftwareRenderer::new(1, 1));
        FrameLoop::new(config, renderer, &mut builtin_assets()).unwrap()
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn environment_map_captures_before_main_every_tick() {
        let mut fl = frame_loop(small_config(DemoScene::EnvironmentMap));
        for i in 0..3 {
            let report = fl.tick(secs(i as f32 * 0.25)).unwrap();
            assert!(matches!(report.capture, Some(CaptureOutcome::Captured { .. })));
            fl.verify_frame(report.frame).unwrap();

            let reflective = fl.capturer().unwrap().reflective().unwrap();
            let layers = fl.scene().get(reflective).unwrap().layers;
            assert!(!fl.capturer().unwrap().capture_layers().intersects(layers));
        }
        assert_eq!(fl.capturer().unwrap().captures(), 3);
    }

    #[test]
    fn main_pass_is_last_in_frame() {
        let mut fl = frame_loop(small_config(DemoScene::EnvironmentMap));
        let report = fl.tick(secs(0.0)).unwrap();
        let passes: Vec<_> = fl.renderer().frame_log().passes_in(report.frame).copied().collect();
        assert_eq!(passes.len(), 7);
        assert_eq!(passes.last().unwrap().kind, PassKind::Main);
        assert!(passes.iter().all(|p| p.scene_revision == report.scene_revision));
    }

    #[test]
    fn throttled_frames_skip_capture_but_still_render() {
        let mut config = small_config(DemoScene::EnvironmentMap);
        config.capture_policy = CapturePolicy::EveryNth(2);
        let mut fl = frame_loop(config);

        let first = fl.tick(secs(0.0)).unwrap();
        let second = fl.tick(secs(0.1)).unwrap();
        assert!(matches!(first.capture, Some(CaptureOutcome::Captured { .. })));
        assert_eq!(second.capture, Some(CaptureOutcome::Skipped));
        fl.verify_frame(second.frame).unwrap();
        assert_eq!(fl.renderer().frame_log().passes_in(second.frame).count(), 1);
    }

    #[test]
    fn replayed_time_reproduces_scene_state() {
        let times = [0.0, 0.4, 1.3, 2.2];
        let run = || {
            let mut fl = frame_loop(small_config(DemoScene::EnvironmentMap));
            let donut = fl.capturer().unwrap().reflective().unwrap();
            times
                .iter()
                .map(|t| {
                    fl.tick(secs(*t)).unwrap();
                    fl.scene().get(donut).unwrap().transform
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn portal_has_no_capture() {
        let mut fl = frame_loop(small_config(DemoScene::Portal));
        assert!(fl.capturer().is_none());
        let report = fl.tick(secs(0.0)).unwrap();
        assert_eq!(report.capture, None);
        fl.verify_frame(report.frame).unwrap();
    }

    #[test]
    fn fireflies_size_change_reaches_next_render() {
        let mut fl = frame_loop(small_config(DemoScene::Portal));
        let fireflies = fl.scene().find_by_name("fireflies").unwrap();

        fl.tick(secs(0.0)).unwrap();
        assert_eq!(
            fl.renderer().uploaded_uniform(fireflies, "uSize"),
            Some(UniformValue::Float(150.0))
        );

        fl.handle(HostEvent::PanelInput {
            control: "firefliesSize".into(),
            value: "300".into(),
        })
        .unwrap();
        // Not uploaded until something renders.
        assert_eq!(
            fl.renderer().uploaded_uniform(fireflies, "uSize"),
            Some(UniformValue::Float(150.0))
        );

        fl.tick(secs(0.016)).unwrap();
        assert_eq!(
            fl.renderer().uploaded_uniform(fireflies, "uSize"),
            Some(UniformValue::Float(300.0))
        );
    }

    #[test]
    fn out_of_range_panel_input_is_rejected() {
        let mut fl = frame_loop(small_config(DemoScene::Portal));
        let err = fl.set_control("firefliesSize", PanelValue::Number(900.0)).unwrap_err();
        assert!(matches!(err, HostError::Panel(PanelError::OutOfRange { .. })));
        assert_eq!(fl.control("firefliesSize").unwrap(), PanelValue::Number(150.0));
    }

    #[test]
    fn resize_updates_camera_renderer_and_fireflies() {
        let mut fl = frame_loop(small_config(DemoScene::Portal));
        let fireflies = fl.scene().find_by_name("fireflies").unwrap();
        let resize = HostEvent::Resize {
            width: 40,
            height: 20,
            device_pixel_ratio: 3.0,
        };

        fl.handle(resize.clone()).unwrap();
        let once = (fl.viewport(), fl.camera().clone(), fl.renderer().size(), fl.scene().state_hash());
        fl.handle(resize).unwrap();
        let twice = (fl.viewport(), fl.camera().clone(), fl.renderer().size(), fl.scene().state_hash());

        assert_eq!(once, twice);
        assert_eq!(fl.camera().aspect, 2.0);
        assert_eq!(fl.renderer().pixel_ratio(), 2.0);
        assert_eq!(fl.scene().uniform(fireflies, "uPixelRatio"), Some(UniformValue::Float(2.0)));
    }

    #[test]
    fn tone_mapping_choice_drives_renderer() {
        let mut fl = frame_loop(small_config(DemoScene::EnvironmentMap));
        assert_eq!(fl.renderer().settings().tone_mapping, ToneMapping::AcesFilmic);
        fl.handle(HostEvent::PanelInput {
            control: "toneMapping".into(),
            value: "Reinhard".into(),
        })
        .unwrap();
        assert_eq!(fl.renderer().settings().tone_mapping, ToneMapping::Reinhard);
        assert_eq!(fl.state().config.tone_mapping, ToneMapping::Reinhard);
    }
}
