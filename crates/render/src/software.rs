use crate::camera::PerspectiveCamera;
use crate::frame_log::{FrameLog, PassKind};
use crate::renderer::{Capabilities, RenderError, RenderSettings, Renderer};
use crate::target::{CubeFace, CubeRenderTarget, Framebuffer, Pixel};
use glam::{Mat4, Vec2, Vec3};
use lumen_common::{LayerMask, NodeId};
use lumen_scene::{
    Background, Environment, Geometry, LightKind, Material, NodeKind, SceneGraph, SkyGradient, TextureId,
    UniformValue, Uniforms,
};
use std::collections::BTreeMap;

const MAX_STEPS: usize = 128;
const HIT_EPSILON: f32 = 1e-3;
/// World-space radius of a unit-scale point sprite.
const POINT_RADIUS: f32 = 0.05;

type CubeFaces = [Framebuffer; 6];

/// Texel storage behind a `CubeRenderTarget`.
///
/// Faces are written into `back` and published to `front` once all six have
/// been rendered, so samplers never observe a half-finished capture. Both
/// sets are allocated once and reused for every capture.
struct CubeStorage {
    front: CubeFaces,
    back: CubeFaces,
    written: [bool; 6],
}

impl CubeStorage {
    fn new(resolution: u32) -> Self {
        Self {
            front: std::array::from_fn(|_| Framebuffer::new(resolution, resolution)),
            back: std::array::from_fn(|_| Framebuffer::new(resolution, resolution)),
            written: [false; 6],
        }
    }

    fn commit(&mut self, face: CubeFace) {
        self.written[face.index()] = true;
        if self.written.iter().all(|w| *w) {
            std::mem::swap(&mut self.front, &mut self.back);
            self.written = [false; 6];
        }
    }
}

fn sample_cube(faces: &CubeFaces, dir: Vec3) -> Vec3 {
    let face = CubeFace::for_direction(dir);
    let fb = &faces[face.index()];
    let forward = face.forward();
    let up = face.up();
    let right = forward.cross(up);
    let z = dir.dot(forward).max(f32::EPSILON);
    let x = dir.dot(right) / z;
    let y = dir.dot(up) / z;
    let res = fb.width().max(1) as f32;
    let col = (((x + 1.0) * 0.5 * res) as u32).min(fb.width().saturating_sub(1));
    let row = (((1.0 - y) * 0.5 * res) as u32).min(fb.height().saturating_sub(1));
    fb.get(col, row).map(|p| p.color).unwrap_or(Vec3::ZERO)
}

/// Where the environment term of PBR materials comes from during a pass.
enum EnvSource<'a> {
    None,
    Sky(SkyGradient),
    Cube(&'a CubeFaces),
}

impl EnvSource<'_> {
    fn sample(&self, dir: Vec3) -> Option<Vec3> {
        match self {
            Self::None => None,
            Self::Sky(sky) => Some(sky.sample(dir)),
            Self::Cube(faces) => Some(sample_cube(faces, dir)),
        }
    }
}

/// Resolve the scene environment. While rendering into `current`, lookups of
/// that same texture read its published (previous) contents.
fn resolve_env<'a>(
    scene: &SceneGraph,
    targets: &'a BTreeMap<TextureId, CubeStorage>,
    current: Option<(TextureId, &'a CubeFaces)>,
) -> EnvSource<'a> {
    match scene.environment() {
        None => EnvSource::None,
        Some(Environment::Sky(sky)) => EnvSource::Sky(*sky),
        Some(Environment::Cube(id)) => match current {
            Some((current_id, faces)) if current_id == *id => EnvSource::Cube(faces),
            _ => match targets.get(id) {
                Some(storage) => EnvSource::Cube(&storage.front),
                None => {
                    tracing::warn!(texture = id.0, "environment references unknown texture");
                    EnvSource::None
                }
            },
        },
    }
}

enum Shape<'a> {
    Geometry(Geometry),
    Points { positions: &'a [Vec3], scales: &'a [f32] },
}

impl Shape<'_> {
    fn local_distance(&self, p: Vec3) -> f32 {
        match self {
            Self::Geometry(g) => geometry_distance(g, p),
            Self::Points { positions, scales } => positions
                .iter()
                .enumerate()
                .map(|(i, c)| (p - *c).length() - POINT_RADIUS * scales.get(i).copied().unwrap_or(1.0))
                .fold(f32::INFINITY, f32::min),
        }
    }

    fn local_radius(&self) -> f32 {
        match self {
            Self::Geometry(g) => g.bounding_radius(),
            Self::Points { positions, scales } => {
                let reach = positions.iter().map(|p| p.length()).fold(0.0, f32::max);
                let sprite = scales.iter().copied().fold(1.0, f32::max);
                reach + POINT_RADIUS * sprite
            }
        }
    }
}

/// Signed distance to a shape in its local space.
fn geometry_distance(geometry: &Geometry, p: Vec3) -> f32 {
    match *geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => box_distance(p, Vec3::new(width, height, depth) * 0.5),
        Geometry::Sphere { radius } => p.length() - radius,
        Geometry::Torus { radius, tube } => torus_distance(p, radius, tube),
        // Swept proxy: the knot stays within a fattened torus around its core.
        Geometry::TorusKnot { radius, tube } => torus_distance(p, radius, tube + 0.5 * radius),
        Geometry::Plane { width, height } => box_distance(p, Vec3::new(width * 0.5, height * 0.5, 0.005)),
    }
}

fn box_distance(p: Vec3, half: Vec3) -> f32 {
    let q = p.abs() - half;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

fn torus_distance(p: Vec3, radius: f32, tube: f32) -> f32 {
    let q = Vec2::new(Vec2::new(p.x, p.y).length() - radius, p.z);
    q.length() - tube
}

struct Drawable<'a> {
    id: NodeId,
    shape: Shape<'a>,
    material: &'a Material,
    inverse: Mat4,
    /// Smallest world scale axis; converts local distances to a safe world bound.
    min_scale: f32,
    center: Vec3,
    radius: f32,
}

impl Drawable<'_> {
    fn distance(&self, p: Vec3) -> f32 {
        self.shape.local_distance(self.inverse.transform_point3(p)) * self.min_scale
    }

    fn normal(&self, p: Vec3, fallback: Vec3) -> Vec3 {
        let h = HIT_EPSILON;
        let grad = Vec3::new(
            self.distance(p + Vec3::X * h) - self.distance(p - Vec3::X * h),
            self.distance(p + Vec3::Y * h) - self.distance(p - Vec3::Y * h),
            self.distance(p + Vec3::Z * h) - self.distance(p - Vec3::Z * h),
        );
        let n = grad.normalize_or_zero();
        if n == Vec3::ZERO { fallback } else { n }
    }

    /// Ray parameter interval inside the bounding sphere, clipped to `near`.
    fn bounds_interval(&self, origin: Vec3, dir: Vec3, near: f32) -> Option<(f32, f32)> {
        let oc = origin - self.center;
        let b = oc.dot(dir);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let s = disc.sqrt();
        let (t0, t1) = (-b - s, -b + s);
        (t1 >= near).then_some((t0.max(near), t1))
    }
}

struct LightSample {
    kind: LightKind,
    radiance: Vec3,
    position: Vec3,
}

struct Prepared<'a> {
    drawables: Vec<Drawable<'a>>,
    lights: Vec<LightSample>,
}

fn prepare(scene: &SceneGraph, layers: LayerMask) -> Prepared<'_> {
    let mut drawables = Vec::new();
    let mut lights = Vec::new();
    for (id, node) in scene.visible_to(layers) {
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };
        let (shape, material) = match &node.kind {
            NodeKind::Mesh { geometry, material } => (Shape::Geometry(*geometry), material),
            NodeKind::Points {
                positions,
                scales,
                material,
            } => (Shape::Points { positions, scales }, material),
            NodeKind::Light(light) => {
                lights.push(LightSample {
                    kind: light.kind,
                    radiance: light.color.to_vec3() * light.intensity,
                    position: world.transform_point3(Vec3::ZERO),
                });
                continue;
            }
            NodeKind::Group => continue,
        };
        let axes = [
            world.x_axis.truncate().length(),
            world.y_axis.truncate().length(),
            world.z_axis.truncate().length(),
        ];
        let min_scale = axes.iter().copied().fold(f32::INFINITY, f32::min);
        let max_scale = axes.iter().copied().fold(0.0, f32::max);
        if min_scale <= f32::EPSILON {
            continue;
        }
        let radius = shape.local_radius() * max_scale;
        drawables.push(Drawable {
            id,
            shape,
            material,
            inverse: world.inverse(),
            min_scale,
            center: world.transform_point3(Vec3::ZERO),
            radius,
        });
    }
    Prepared { drawables, lights }
}

/// Sphere-trace a ray against the prepared drawables.
fn trace(
    prepared: &Prepared<'_>,
    origin: Vec3,
    dir: Vec3,
    near: f32,
    far: f32,
    candidates: &mut Vec<usize>,
) -> Option<(usize, f32)> {
    candidates.clear();
    let mut t = f32::INFINITY;
    let mut t_end: f32 = 0.0;
    for (i, d) in prepared.drawables.iter().enumerate() {
        if let Some((t0, t1)) = d.bounds_interval(origin, dir, near) {
            candidates.push(i);
            t = t.min(t0);
            t_end = t_end.max(t1);
        }
    }
    if candidates.is_empty() {
        return None;
    }
    let t_end = t_end.min(far);
    for _ in 0..MAX_STEPS {
        if t > t_end {
            break;
        }
        let p = origin + dir * t;
        let (dist, idx) = candidates
            .iter()
            .map(|&i| (prepared.drawables[i].distance(p), i))
            .fold((f32::INFINITY, usize::MAX), |best, cur| if cur.0 < best.0 { cur } else { best });
        if dist < HIT_EPSILON * t.max(1.0) {
            return Some((idx, t));
        }
        t += dist.max(HIT_EPSILON * 0.5);
    }
    None
}

fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

fn direct_light(lights: &[LightSample], p: Vec3, n: Vec3) -> Vec3 {
    lights.iter().fold(Vec3::ZERO, |acc, light| {
        let contribution = match light.kind {
            LightKind::Ambient => light.radiance,
            LightKind::Directional { direction } => {
                let l = -direction.normalize_or_zero();
                light.radiance * n.dot(l).max(0.0)
            }
            LightKind::Point { range } => {
                let to_light = light.position - p;
                let dist = to_light.length().max(f32::EPSILON);
                let atten = if range > 0.0 {
                    (1.0 - dist / range).clamp(0.0, 1.0).powi(2)
                } else {
                    1.0
                };
                light.radiance * n.dot(to_light / dist).max(0.0) * atten
            }
        };
        acc + contribution
    })
}

/// Flat preview color for an opaque shader program: its first color uniform.
fn shader_preview(uniforms: &Uniforms) -> Vec3 {
    uniforms
        .values()
        .find_map(UniformValue::as_color)
        .map(|c| c.to_vec3())
        .unwrap_or(Vec3::ONE)
}

struct ShadeContext<'a> {
    lights: &'a [LightSample],
    env: &'a EnvSource<'a>,
    env_intensity: f32,
}

fn shade(ctx: &ShadeContext<'_>, material: &Material, p: Vec3, n: Vec3, view: Vec3) -> Vec3 {
    match material {
        Material::Standard {
            color,
            roughness,
            metalness,
            emissive,
        } => {
            let base = color.to_vec3();
            let diffuse_weight = 1.0 - metalness.clamp(0.0, 1.0);
            let mut out = base * diffuse_weight * direct_light(ctx.lights, p, n) + emissive.to_vec3();
            if let Some(irradiance) = ctx.env.sample(n) {
                out += base * diffuse_weight * irradiance * ctx.env_intensity;
            }
            if let Some(radiance) = ctx.env.sample(reflect(view, n)) {
                let f0 = Vec3::splat(0.04).lerp(base, metalness.clamp(0.0, 1.0));
                let gloss = 1.0 - 0.75 * roughness.clamp(0.0, 1.0);
                out += radiance * f0 * gloss * ctx.env_intensity;
            }
            out
        }
        Material::Basic { color } => color.to_vec3(),
        Material::Shader { uniforms, .. } => shader_preview(uniforms),
    }
}

fn miss_color(scene: &SceneGraph, clear: Vec3, dir: Vec3) -> Vec3 {
    match scene.background() {
        None => clear,
        Some(Background::Color(c)) => c.to_vec3() * scene.background_intensity(),
        Some(Background::Sky(sky)) => sky.sample(dir) * scene.background_intensity(),
    }
}

struct PassInput<'a> {
    scene: &'a SceneGraph,
    prepared: &'a Prepared<'a>,
    env: &'a EnvSource<'a>,
    clear: Vec3,
    tone: Option<(crate::tonemap::ToneMapping, f32)>,
}

fn render_view(input: &PassInput<'_>, camera: &PerspectiveCamera, target: &mut Framebuffer) {
    let (w, h) = (target.width(), target.height());
    let ctx = ShadeContext {
        lights: &input.prepared.lights,
        env: input.env,
        env_intensity: input.scene.environment_intensity(),
    };
    let forward = camera.forward();
    let mut candidates = Vec::with_capacity(input.prepared.drawables.len());
    let pixels = target.pixels_mut();
    for row in 0..h {
        let ndc_y = 1.0 - ((row as f32 + 0.5) / h as f32) * 2.0;
        for col in 0..w {
            let ndc_x = ((col as f32 + 0.5) / w as f32) * 2.0 - 1.0;
            let dir = camera.ray_direction(ndc_x, ndc_y);
            let cos = dir.dot(forward).max(f32::EPSILON);
            let hit = trace(
                input.prepared,
                camera.position,
                dir,
                camera.near / cos,
                camera.far / cos,
                &mut candidates,
            );
            let pixel = match hit {
                Some((idx, t)) => {
                    let d = &input.prepared.drawables[idx];
                    let p = camera.position + dir * t;
                    let n = d.normal(p, -dir);
                    Pixel {
                        color: shade(&ctx, d.material, p, n, dir),
                        node: Some(d.id),
                    }
                }
                None => Pixel {
                    color: miss_color(input.scene, input.clear, dir),
                    node: None,
                },
            };
            let color = match input.tone {
                Some((mapping, exposure)) => mapping.apply(pixel.color, exposure),
                None => pixel.color,
            };
            pixels[(row * w + col) as usize] = Pixel { color, ..pixel };
        }
    }
}

fn record_uploads(uploaded: &mut BTreeMap<NodeId, Uniforms>, prepared: &Prepared<'_>) {
    for d in &prepared.drawables {
        if let Some(uniforms) = d.material.uniforms() {
            uploaded.insert(d.id, uniforms.clone());
        }
    }
}

/// Headless reference backend.
///
/// Sphere-traces every pixel against node shapes (exact for boxes, spheres,
/// tori and planes; a swept torus for knots). Slow, deterministic, and
/// inspectable: every pixel remembers which node covered it.
pub struct SoftwareRenderer {
    capabilities: Capabilities,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    settings: RenderSettings,
    surface: Framebuffer,
    targets: BTreeMap<TextureId, CubeStorage>,
    next_texture: u64,
    frame: u64,
    log: FrameLog,
    uploaded: BTreeMap<NodeId, Uniforms>,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: Capabilities::default(),
            width,
            height,
            pixel_ratio: 1.0,
            settings: RenderSettings::default(),
            surface: Framebuffer::default(),
            targets: BTreeMap::new(),
            next_texture: 1,
            frame: 0,
            log: FrameLog::default(),
            uploaded: BTreeMap::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Drawing-buffer size: logical size times pixel ratio.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32) * self.pixel_ratio).round().max(1.0) as u32;
        (scale(self.width), scale(self.height))
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl Renderer for SoftwareRenderer {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn begin_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    fn current_frame(&self) -> u64 {
        self.frame
    }

    fn create_cube_target(&mut self, resolution: u32) -> Result<CubeRenderTarget, RenderError> {
        if resolution == 0 {
            return Err(RenderError::ZeroSizedTarget);
        }
        if resolution > self.capabilities.max_cube_resolution {
            return Err(RenderError::TargetTooLarge {
                requested: resolution,
                max: self.capabilities.max_cube_resolution,
            });
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.targets.insert(id, CubeStorage::new(resolution));
        tracing::debug!(texture = id.0, resolution, "cube target allocated");
        Ok(CubeRenderTarget::new(id, resolution))
    }

    fn dispose_cube_target(&mut self, target: CubeRenderTarget) {
        if self.targets.remove(&target.texture()).is_some() {
            tracing::debug!(texture = target.texture().0, "cube target disposed");
        }
    }

    fn render_cube_face(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        target: &CubeRenderTarget,
        face: CubeFace,
    ) -> Result<(), RenderError> {
        let texture = target.texture();
        let mut storage = self
            .targets
            .remove(&texture)
            .ok_or(RenderError::UnknownTarget(texture))?;
        {
            let CubeStorage { front, back, .. } = &mut storage;
            let prepared = prepare(scene, camera.layers);
            let env = resolve_env(scene, &self.targets, Some((texture, &*front)));
            let input = PassInput {
                scene,
                prepared: &prepared,
                env: &env,
                clear: self.settings.clear_color.to_vec3(),
                tone: None,
            };
            render_view(&input, camera, &mut back[face.index()]);
            record_uploads(&mut self.uploaded, &prepared);
        }
        storage.commit(face);
        self.targets.insert(texture, storage);
        self.log
            .record(self.frame, PassKind::CubeFace { target: texture, face }, scene.revision());
        tracing::trace!(frame = self.frame, face = face.label(), "cube face rendered");
        Ok(())
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let _span = tracing::debug_span!("main_pass", frame = self.frame).entered();
        let (w, h) = self.drawing_buffer_size();
        self.surface.resize(w, h);
        let prepared = prepare(scene, camera.layers);
        let env = resolve_env(scene, &self.targets, None);
        let input = PassInput {
            scene,
            prepared: &prepared,
            env: &env,
            clear: self.settings.clear_color.to_vec3(),
            tone: Some((self.settings.tone_mapping, self.settings.tone_mapping_exposure)),
        };
        render_view(&input, camera, &mut self.surface);
        record_uploads(&mut self.uploaded, &prepared);
        self.log.record(self.frame, PassKind::Main, scene.revision());
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    fn frame_log(&self) -> &FrameLog {
        &self.log
    }

    fn uploaded_uniform(&self, node: NodeId, name: &str) -> Option<UniformValue> {
        self.uploaded.get(&node)?.get(name).copied()
    }

    fn surface(&self) -> &Framebuffer {
        &self.surface
    }

    fn cube_face(&self, texture: TextureId, face: CubeFace) -> Option<&Framebuffer> {
        self.targets.get(&texture).map(|s| &s.front[face.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_common::{Color, Layer, Transform};
    use lumen_scene::{Light, SceneNode};

    fn camera_at(position: Vec3, target: Vec3) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        cam.position = position;
        cam.look_at(target);
        cam
    }

    fn red_ball(scene: &mut SceneGraph) -> NodeId {
        scene.add(SceneNode::mesh(
            "ball",
            Geometry::Sphere { radius: 1.0 },
            Material::basic(Color::rgb(1.0, 0.0, 0.0)),
        ))
    }

    #[test]
    fn sphere_covers_centre_pixel() {
        let mut scene = SceneGraph::new();
        let ball = red_ball(&mut scene);
        let mut r = SoftwareRenderer::new(16, 16);
        r.render(&scene, &camera_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)).unwrap();
        let centre = r.surface().get(8, 8).unwrap();
        assert_eq!(centre.node, Some(ball));
        assert!((centre.color - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        // corners miss the ball
        assert_eq!(r.surface().get(0, 0).unwrap().node, None);
    }

    #[test]
    fn camera_layers_filter_nodes() {
        let mut scene = SceneGraph::new();
        let ball = red_ball(&mut scene);
        scene.set_layers(ball, LayerMask::only(Layer::REFLECTIVE)).unwrap();
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam.layers = LayerMask::only(Layer::DEFAULT);
        let mut r = SoftwareRenderer::new(8, 8);
        r.render(&scene, &cam).unwrap();
        assert_eq!(r.surface().coverage(ball), 0);
    }

    #[test]
    fn miss_uses_clear_color_without_background() {
        let scene = SceneGraph::new();
        let mut r = SoftwareRenderer::new(4, 4);
        r.settings_mut().clear_color = Color::from_hex(0x201919);
        r.render(&scene, &PerspectiveCamera::default()).unwrap();
        let expected = Color::from_hex(0x201919).to_vec3();
        assert!((r.surface().get(1, 1).unwrap().color - expected).length() < 1e-5);
    }

    #[test]
    fn drawing_buffer_follows_pixel_ratio() {
        let mut r = SoftwareRenderer::new(10, 6);
        r.set_pixel_ratio(2.0);
        r.render(&SceneGraph::new(), &PerspectiveCamera::default()).unwrap();
        assert_eq!((r.surface().width(), r.surface().height()), (20, 12));
    }

    #[test]
    fn cube_target_lifecycle() {
        let mut r = SoftwareRenderer::new(4, 4);
        assert_eq!(r.create_cube_target(0), Err(RenderError::ZeroSizedTarget));
        let target = r.create_cube_target(8).unwrap();
        let id = target.texture();
        assert_eq!(target.resolution(), 8);
        assert!(r.cube_face(id, CubeFace::PositiveX).is_some());
        r.dispose_cube_target(target);
        assert!(r.cube_face(id, CubeFace::PositiveX).is_none());
        assert_eq!(r.target_count(), 0);
    }

    #[test]
    fn faces_publish_after_full_capture() {
        let mut scene = SceneGraph::new();
        scene.set_background(Some(Background::Color(Color::WHITE)));
        let mut r = SoftwareRenderer::new(4, 4);
        let target = r.create_cube_target(4).unwrap();
        let mut cam = PerspectiveCamera::new(90.0, 1.0, 0.1, 100.0);
        for (i, face) in CubeFace::ALL.into_iter().enumerate() {
            cam.orient(face.forward(), face.up());
            r.render_cube_face(&scene, &cam, &target, face).unwrap();
            let published = r.cube_face(target.texture(), CubeFace::PositiveX).unwrap();
            if i < 5 {
                assert_eq!(published.average_color(), Vec3::ZERO);
            } else {
                assert_eq!(published.average_color(), Vec3::ONE);
            }
        }
    }

    #[test]
    fn cube_sampling_matches_face_render() {
        // A ball straight along +X must land in the +X face and be sampled back.
        let mut scene = SceneGraph::new();
        let ball = scene.add(
            SceneNode::mesh(
                "ball",
                Geometry::Sphere { radius: 1.0 },
                Material::basic(Color::rgb(0.0, 1.0, 0.0)),
            )
            .with_transform(Transform::from_position(Vec3::new(5.0, 0.0, 0.0))),
        );
        let mut r = SoftwareRenderer::new(4, 4);
        let target = r.create_cube_target(16).unwrap();
        let mut cam = PerspectiveCamera::new(90.0, 1.0, 0.1, 100.0);
        for face in CubeFace::ALL {
            cam.orient(face.forward(), face.up());
            r.render_cube_face(&scene, &cam, &target, face).unwrap();
        }
        assert!(r.cube_face(target.texture(), CubeFace::PositiveX).unwrap().coverage(ball) > 0);
        assert_eq!(r.cube_face(target.texture(), CubeFace::NegativeX).unwrap().coverage(ball), 0);
        let faces = &r.targets[&target.texture()].front;
        assert!((sample_cube(faces, Vec3::X) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(sample_cube(faces, Vec3::NEG_X), Vec3::ZERO);
    }

    #[test]
    fn metallic_surface_reflects_environment() {
        let mut scene = SceneGraph::new();
        let sky = SkyGradient {
            zenith: Color::WHITE,
            horizon: Color::WHITE,
            ground: Color::WHITE,
        };
        scene.set_environment(Some(Environment::Sky(sky)));
        let ball = scene.add(SceneNode::mesh(
            "chrome",
            Geometry::Sphere { radius: 1.0 },
            Material::standard(Color::WHITE, 0.0, 1.0),
        ));
        let mut r = SoftwareRenderer::new(9, 9);
        r.render(&scene, &camera_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)).unwrap();
        let centre = r.surface().get(4, 4).unwrap();
        assert_eq!(centre.node, Some(ball));
        assert!(centre.color.x > 0.9);

        scene.set_environment(None);
        r.render(&scene, &camera_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)).unwrap();
        assert_eq!(r.surface().get(4, 4).unwrap().color, Vec3::ZERO);
    }

    #[test]
    fn point_light_lights_facing_side() {
        let mut scene = SceneGraph::new();
        let ball = scene.add(SceneNode::mesh(
            "ball",
            Geometry::Sphere { radius: 1.0 },
            Material::standard(Color::WHITE, 1.0, 0.0),
        ));
        scene.add(
            SceneNode::light(
                "lamp",
                Light {
                    kind: LightKind::Point { range: 0.0 },
                    color: Color::WHITE,
                    intensity: 1.0,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 5.0))),
        );
        let mut r = SoftwareRenderer::new(9, 9);
        r.render(&scene, &camera_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)).unwrap();
        let centre = r.surface().get(4, 4).unwrap();
        assert_eq!(centre.node, Some(ball));
        assert!(centre.color.x > 0.5);
    }

    #[test]
    fn shader_uniforms_are_uploaded() {
        let mut scene = SceneGraph::new();
        let id = scene.add(SceneNode::new(
            "fireflies",
            NodeKind::Points {
                positions: vec![Vec3::ZERO],
                scales: vec![1.0],
                material: Material::Shader {
                    uniforms: Uniforms::from([("uSize".to_string(), UniformValue::Float(150.0))]),
                    transparent: true,
                    additive: true,
                },
            },
        ));
        let mut r = SoftwareRenderer::new(4, 4);
        assert_eq!(r.uploaded_uniform(id, "uSize"), None);
        r.render(&scene, &camera_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO)).unwrap();
        assert_eq!(r.uploaded_uniform(id, "uSize"), Some(UniformValue::Float(150.0)));
    }

    #[test]
    fn passes_are_logged_per_frame() {
        let scene = SceneGraph::new();
        let mut r = SoftwareRenderer::new(2, 2);
        let frame = r.begin_frame();
        r.render(&scene, &PerspectiveCamera::default()).unwrap();
        assert_eq!(frame, 1);
        assert_eq!(r.frame_log().passes_in(1).count(), 1);
    }

    #[test]
    fn torus_distance_is_zero_on_surface() {
        let d = torus_distance(Vec3::new(8.5, 0.0, 0.0), 8.0, 0.5);
        assert!(d.abs() < 1e-6);
        // the torus hole is empty
        assert!(torus_distance(Vec3::ZERO, 8.0, 0.5) > 7.0);
    }
}
