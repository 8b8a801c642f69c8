//! Debug panel layouts for each demo scene.

use crate::frame_loop::{DemoState, HostError};
use lumen_common::{Color, NodeId};
use lumen_compose::DemoScene;
use lumen_render::ToneMapping;
use lumen_scene::{SceneGraph, UniformValue};
use lumen_tools::{DebugPanel, PanelValue};

const INTENSITY_RANGE: (f32, f32, f32) = (0.0, 10.0, 0.001);

/// Panel for `kind`, bound to nodes already present in `scene`.
pub fn build(kind: DemoScene, scene: &SceneGraph) -> Result<DebugPanel<DemoState>, HostError> {
    match kind {
        DemoScene::EnvironmentMap => environment_map(),
        DemoScene::Portal => portal(scene),
    }
}

fn environment_map() -> Result<DebugPanel<DemoState>, HostError> {
    let mut panel = DebugPanel::new("environment map");

    panel.add_choice(
        "toneMapping",
        ToneMapping::ALL.iter().map(|t| t.label()).collect(),
        |s: &DemoState| s.renderer.settings().tone_mapping.label().to_string(),
        |s: &mut DemoState, label| {
            let mapping = ToneMapping::from_label(label).ok_or_else(|| format!("unknown tone mapping {label}"))?;
            s.config.tone_mapping = mapping;
            s.renderer.settings_mut().tone_mapping = mapping;
            Ok(())
        },
    )?;
    panel.add_number(
        "toneMappingExposure",
        INTENSITY_RANGE,
        |s: &DemoState| s.renderer.settings().tone_mapping_exposure,
        |s: &mut DemoState, v| {
            s.config.tone_mapping_exposure = v;
            s.renderer.settings_mut().tone_mapping_exposure = v;
            Ok(())
        },
    )?;
    panel.add_number(
        "environmentIntensity",
        INTENSITY_RANGE,
        |s: &DemoState| s.scene.environment_intensity(),
        |s: &mut DemoState, v| {
            s.scene.set_environment_intensity(v);
            Ok(())
        },
    )?;
    panel.add_number(
        "backgroundIntensity",
        INTENSITY_RANGE,
        |s: &DemoState| s.scene.background_intensity(),
        |s: &mut DemoState, v| {
            s.scene.set_background_intensity(v);
            Ok(())
        },
    )?;
    panel.add_number(
        "cubeResolution",
        (1.0, 4096.0, 1.0),
        |s: &DemoState| {
            s.capturer
                .as_ref()
                .map_or(s.config.cube_resolution, |c| c.resolution()) as f32
        },
        |s: &mut DemoState, v| {
            let resolution = v as u32;
            let DemoState {
                capturer,
                renderer,
                scene,
                config,
                ..
            } = s;
            if let Some(capturer) = capturer {
                capturer
                    .set_resolution(renderer.as_mut(), scene, resolution)
                    .map_err(|e| e.to_string())?;
            }
            config.cube_resolution = resolution;
            Ok(())
        },
    )?;
    Ok(panel)
}

fn portal(scene: &SceneGraph) -> Result<DebugPanel<DemoState>, HostError> {
    let fireflies = scene.find_by_name("fireflies")?;
    let portal_light = scene.find_by_name("portalLight")?;
    let mut panel = DebugPanel::new("portal");

    panel.add_color(
        "clearColor",
        |s: &DemoState| s.config.clear_color,
        |s: &mut DemoState, c| {
            s.config.clear_color = c;
            Ok(())
        },
    )?;
    panel.on_change("clearColor", |s: &mut DemoState, v| {
        if let PanelValue::Color(c) = v {
            s.renderer.settings_mut().clear_color = *c;
        }
    })?;

    panel.add_number(
        "firefliesSize",
        (0.0, 500.0, 1.0),
        move |s: &DemoState| {
            s.scene
                .uniform(fireflies, "uSize")
                .and_then(|u| u.as_float())
                .unwrap_or(s.config.fireflies_size)
        },
        move |s: &mut DemoState, v| {
            s.scene
                .set_uniform(fireflies, "uSize", UniformValue::Float(v))
                .map_err(|e| e.to_string())?;
            s.config.fireflies_size = v;
            Ok(())
        },
    )?;

    bind_portal_color(&mut panel, "portalColorStart", "uColorStart", portal_light, |s| {
        &mut s.config.portal_color_start
    })?;
    bind_portal_color(&mut panel, "portalColorEnd", "uColorEnd", portal_light, |s| {
        &mut s.config.portal_color_end
    })?;
    Ok(panel)
}

/// A config color mirrored into a portal shader uniform on change.
fn bind_portal_color(
    panel: &mut DebugPanel<DemoState>,
    control: &'static str,
    uniform: &'static str,
    node: NodeId,
    field: fn(&mut DemoState) -> &mut Color,
) -> Result<(), HostError> {
    panel.add_color(
        control,
        move |s: &DemoState| {
            s.scene
                .uniform(node, uniform)
                .and_then(|u| u.as_color())
                .unwrap_or(Color::BLACK)
        },
        move |s: &mut DemoState, c| {
            *field(s) = c;
            Ok(())
        },
    )?;
    panel.on_change(control, move |s: &mut DemoState, v| {
        if let PanelValue::Color(c) = v {
            if let Err(err) = s.scene.set_uniform(node, uniform, UniformValue::Color(*c)) {
                tracing::warn!(%err, control, "portal uniform not updated");
            }
        }
    })?;
    Ok(())
}
