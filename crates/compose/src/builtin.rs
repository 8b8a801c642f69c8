use glam::Vec3;
use lumen_assets::{Asset, EnvironmentDescription, InMemoryLoader, ModelDescription, NodeDescription};
use lumen_common::{Color, Transform};
use lumen_scene::{Geometry, Material};

pub const ENVIRONMENT_PATH: &str = "environments/cabin.json";
pub const HELMET_PATH: &str = "models/flight_helmet.json";
pub const PORTAL_PATH: &str = "models/portal.json";

fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_position(Vec3::new(x, y, z))
}

fn cabin() -> EnvironmentDescription {
    EnvironmentDescription::Sky {
        zenith: Color::from_hex(0x3b2a1e),
        horizon: Color::from_hex(0xd9a066),
        ground: Color::from_hex(0x2a1a10),
    }
}

/// Coarse stand-in for the flight helmet, authored at unit scale.
fn helmet() -> ModelDescription {
    let leather = Material::standard(Color::from_hex(0x6b4a2f), 0.8, 0.0);
    let brass = Material::standard(Color::from_hex(0xc9a45c), 0.35, 1.0);
    let glass = Material::standard(Color::from_hex(0x99aabb), 0.05, 0.2);
    ModelDescription::new(
        NodeDescription::group("FlightHelmet")
            .with_child(
                NodeDescription::mesh(
                    "stand",
                    Geometry::Box {
                        width: 0.25,
                        height: 0.2,
                        depth: 0.25,
                    },
                )
                .with_material(Material::standard(Color::from_hex(0x5b5b5b), 0.6, 0.0))
                .with_transform(at(0.0, 0.1, 0.0)),
            )
            .with_child(
                NodeDescription::mesh("cap", Geometry::Sphere { radius: 0.14 })
                    .with_material(leather)
                    .with_transform(at(0.0, 0.32, 0.0)),
            )
            .with_child(
                NodeDescription::mesh("goggleFrame", Geometry::Torus { radius: 0.06, tube: 0.015 })
                    .with_material(brass)
                    .with_transform(at(0.0, 0.36, 0.12)),
            )
            .with_child(
                NodeDescription::mesh("goggleLens", Geometry::Sphere { radius: 0.05 })
                    .with_material(glass)
                    .with_transform(at(0.0, 0.36, 0.12)),
            ),
    )
}

/// Portal scene with the named nodes the portal composer expects.
fn portal() -> ModelDescription {
    ModelDescription::new(
        NodeDescription::group("portalScene")
            .with_child(NodeDescription::mesh(
                "baked",
                Geometry::Box {
                    width: 4.0,
                    height: 0.1,
                    depth: 4.0,
                },
            ))
            .with_child(
                NodeDescription::mesh(
                    "portalFrame",
                    Geometry::Torus {
                        radius: 0.75,
                        tube: 0.12,
                    },
                )
                .with_transform(at(0.0, 0.9, -1.7)),
            )
            .with_child(
                NodeDescription::mesh(
                    "portalLight",
                    Geometry::Plane {
                        width: 1.3,
                        height: 1.3,
                    },
                )
                .with_transform(at(0.0, 0.9, -1.69)),
            )
            .with_child(
                NodeDescription::mesh("poleLightA", Geometry::Sphere { radius: 0.1 })
                    .with_transform(at(0.7, 1.0, 0.2)),
            )
            .with_child(
                NodeDescription::mesh("poleLightB", Geometry::Sphere { radius: 0.1 })
                    .with_transform(at(-0.7, 1.0, 0.2)),
            ),
    )
}

/// Loader serving the demo assets without touching the filesystem.
pub fn builtin_assets() -> InMemoryLoader {
    InMemoryLoader::new()
        .with(ENVIRONMENT_PATH, Asset::Environment(cabin()))
        .with(HELMET_PATH, Asset::Model(helmet()))
        .with(PORTAL_PATH, Asset::Model(portal()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_assets::AssetLoader;

    #[test]
    fn builtin_assets_load() {
        let mut loader = builtin_assets();
        assert!(loader.load_environment(ENVIRONMENT_PATH).is_ok());
        assert_eq!(loader.load_model(HELMET_PATH).unwrap().node_count(), 5);
        assert_eq!(loader.load_model(PORTAL_PATH).unwrap().node_count(), 6);
    }
}
