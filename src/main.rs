use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use pollster::FutureExt;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use neon_alley::camera::OrbitCamera;
use neon_alley::render::scene_pass::{FrameInputs, ScenePass, SceneTextures};
use neon_alley::render::shadows::{light_space_matrix, ShadowMaps};
use neon_alley::render::WgpuRenderer;
use neon_alley::scene::{build_scene, LightRig, PropSet, SceneRanges, LIGHT_COUNT};
use neon_alley::settings::ViewerSettings;

const FOV_Y: f32 = 60.0 * std::f32::consts::PI / 180.0;
const NEAR: f32 = 0.2;
const FAR: f32 = 100.0;

struct AlleyApp {
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    scene_pass: Option<ScenePass>,
    shadow_maps: Option<ShadowMaps>,
    depth_view: Option<wgpu::TextureView>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    ranges: Option<SceneRanges>,

    camera: OrbitCamera,
    lights: LightRig,
    settings: ViewerSettings,

    start_time: Instant,
}

impl AlleyApp {
    fn new() -> Self {
        Self {
            window: None,
            renderer: None,
            scene_pass: None,
            shadow_maps: None,
            depth_view: None,
            vertex_buffer: None,
            vertex_count: 0,
            ranges: None,
            camera: OrbitCamera::new(),
            lights: LightRig::default(),
            settings: ViewerSettings::default(),
            start_time: Instant::now(),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::ArrowLeft => self.camera.yaw_left(),
            KeyCode::ArrowRight => self.camera.yaw_right(),
            KeyCode::ArrowUp => self.camera.pitch_up(),
            KeyCode::ArrowDown => self.camera.pitch_down(),

            KeyCode::Equal | KeyCode::NumpadAdd => self.camera.zoom_in(),
            KeyCode::Minus | KeyCode::NumpadSubtract => self.camera.zoom_out(),

            KeyCode::KeyJ => self.lights.nudge_key_light(Vec3::new(0.0, -0.2, 0.0)),
            KeyCode::KeyL => self.lights.nudge_key_light(Vec3::new(0.0, 0.2, 0.0)),
            KeyCode::KeyI => self.lights.nudge_key_light(Vec3::new(0.0, 0.0, 0.2)),
            KeyCode::KeyK => self.lights.nudge_key_light(Vec3::new(0.0, 0.0, -0.2)),

            KeyCode::KeyN => {
                self.settings.normal_mapping = !self.settings.normal_mapping;
                log::info!(
                    "normal mapping: {}",
                    if self.settings.normal_mapping { "ON" } else { "OFF" }
                );
            }
            KeyCode::KeyF => {
                self.settings.fog = !self.settings.fog;
                log::info!("fog: {}", if self.settings.fog { "ON" } else { "OFF" });
            }
            KeyCode::KeyM => {
                self.settings.shadows = !self.settings.shadows;
                log::info!(
                    "shadow mapping: {}",
                    if self.settings.shadows { "ON" } else { "OFF" }
                );
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        let (renderer, scene_pass, shadow_maps, vertex_buffer, ranges) = match (
            self.renderer.as_mut(),
            self.scene_pass.as_ref(),
            self.shadow_maps.as_ref(),
            self.vertex_buffer.as_ref(),
            self.ranges.as_ref(),
        ) {
            (Some(r), Some(sp), Some(sm), Some(vb), Some(rg)) => (r, sp, sm, vb, rg),
            _ => return,
        };

        let frame = match renderer.begin_frame() {
            Some(f) => f,
            None => {
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
                return;
            }
        };
        let color_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = renderer
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Alley Frame Encoder"),
            });

        // Settings are read once here and hold for the whole frame.
        let settings = self.settings;
        let model = Mat4::IDENTITY;

        // Light-space transforms are rebuilt from scratch every frame; the
        // key light may have moved since the last one.
        let mut light_space = [Mat4::IDENTITY; LIGHT_COUNT];
        for i in 0..LIGHT_COUNT {
            light_space[i] = light_space_matrix(self.lights.positions[i]);
        }

        // 1) depth-only passes, strictly before the color pass that samples
        // their targets
        if settings.shadows {
            shadow_maps.render(
                &renderer.queue,
                &mut encoder,
                vertex_buffer,
                ranges,
                model,
                &light_space,
            );
        }

        // 2) main color pass over the full stream
        let (width, height) = renderer.get_viewport_size();
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let proj = Mat4::perspective_rh(FOV_Y, aspect, NEAR, FAR);

        let frame_inputs = FrameInputs {
            view: self.camera.view(),
            proj,
            model,
            camera_pos: self.camera.eye(),
            lights: &self.lights,
            light_space,
            settings,
            time_sec: self.start_time.elapsed().as_secs_f32(),
        };

        let depth_view = self.depth_view.as_ref().unwrap();
        scene_pass.render(
            &renderer.queue,
            &mut encoder,
            &color_view,
            depth_view,
            vertex_buffer,
            self.vertex_count,
            &frame_inputs,
        );

        renderer.queue.submit(Some(encoder.finish()));
        renderer.end_frame(frame);

        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AlleyApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Neon Alley")
            .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 900.0));
        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        let renderer = WgpuRenderer::new(window.clone()).block_on().unwrap();

        // Scene geometry is baked once; everything after this is per-frame
        // transform work.
        let props = PropSet::load();
        let built = build_scene(&props);
        let vertex_buffer = renderer
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Alley Vertex Buffer"),
                contents: bytemuck::cast_slice(&built.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        log::info!(
            "scene ready: {} vertices ({} casters)",
            built.vertices.len(),
            built.ranges.shadow_casters_count
        );

        let textures = SceneTextures::load(&renderer.device, &renderer.queue);
        let shadow_maps = ShadowMaps::new(&renderer.device);
        let scene_pass = ScenePass::new(
            &renderer.device,
            renderer.surface_config.format,
            &textures,
            &shadow_maps,
        );

        self.depth_view = Some(renderer.create_depth_texture());
        self.vertex_count = built.vertices.len() as u32;
        self.ranges = Some(built.ranges);
        self.vertex_buffer = Some(vertex_buffer);
        self.shadow_maps = Some(shadow_maps);
        self.scene_pass = Some(scene_pass);
        self.renderer = Some(renderer);
        self.window = Some(window.clone());

        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(size);
                    self.depth_view = Some(renderer.create_depth_texture());
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape {
                        event_loop.exit();
                        return;
                    }
                    self.handle_key(code);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().unwrap();
    let mut app = AlleyApp::new();
    event_loop.run_app(&mut app).unwrap();
}
