use anyhow::{Context, Result};
use clap::Parser;
use cubescene_input::{Action, Key, OrbitInput, PointerButton, map_key};
use cubescene_kernel::{Light, Scene, SceneConfig};
use cubescene_render_wgpu::{OrbitCamera, WgpuRenderer};
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Longest step fed to the scene, so a stalled window does not make the
/// animation jump.
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Parser)]
#[command(name = "cubescene-desktop", about = "Animated cube scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML). Defaults to the stock scene.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Application state that does not depend on the GPU.
struct AppState {
    scene: Scene,
    camera: OrbitCamera,
    input: OrbitInput,
    show_overlay: bool,
    last_frame: Instant,
    last_dt: f32,
}

impl AppState {
    fn new(scene: Scene, aspect: f32) -> Self {
        let camera = OrbitCamera::from_config(scene.camera(), aspect);
        Self {
            scene,
            camera,
            input: OrbitInput::new(),
            show_overlay: true,
            last_frame: Instant::now(),
            last_dt: 0.0,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;
        self.last_dt = dt;
        self.scene.frame(dt);
        self.camera.update();
    }

    fn apply(&mut self, action: Action, viewport_height: f32) {
        match action {
            Action::Orbit { dx, dy } => self.camera.rotate(dx, dy, viewport_height),
            Action::Pan { dx, dy } => self.camera.pan(dx, dy, viewport_height),
            Action::Zoom(steps) => self.camera.dolly(steps),
            Action::ResetCamera => self.camera.reset(),
            Action::TogglePause => {
                let paused = !self.scene.is_paused();
                self.scene.set_paused(paused);
            }
            Action::ToggleAxes => {
                let visible = !self.scene.axes().visible;
                self.scene.set_axes_visible(visible);
            }
            Action::ToggleGrid => {
                let visible = !self.scene.grid().visible;
                self.scene.set_grid_visible(visible);
            }
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Action::Noop => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::SidePanel::left("overlay")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Cube Scene");
                ui.separator();
                let clock = self.scene.clock();
                ui.label(format!("Time: {:.2}s  Frame: {}", clock.elapsed(), clock.frame()));
                if self.last_dt > 0.0 {
                    ui.label(format!("FPS: {:.0}", 1.0 / self.last_dt));
                }
                let view = self.camera.view();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})  FOV: {:.0}",
                    view.eye.x, view.eye.y, view.eye.z, view.fov_degrees
                ));
                ui.label(format!(
                    "Target: ({:.1}, {:.1}, {:.1})",
                    view.target.x, view.target.y, view.target.z
                ));
                ui.separator();

                ui.heading("Mesh");
                match self.scene.mesh() {
                    Some(node) => {
                        let t = &node.transform;
                        ui.label(format!(
                            "Position: ({:.2}, {:.2}, {:.2})",
                            t.position.x, t.position.y, t.position.z
                        ));
                        ui.label(format!(
                            "Rotation: ({:.2}, {:.2}, {:.2})",
                            t.rotation.x, t.rotation.y, t.rotation.z
                        ));
                        ui.label(format!("Scale: {:.3}", t.scale.x));
                        let [r, g, b] = node.material.color.to_srgb_bytes();
                        ui.colored_label(egui::Color32::from_rgb(r, g, b), "Material color");
                    }
                    None => {
                        ui.label("not mounted");
                    }
                }
                ui.separator();

                ui.heading("Lights");
                for light in self.scene.lights() {
                    match light {
                        Light::Ambient { intensity, .. } => {
                            ui.label(format!("Ambient {intensity:.2}"));
                        }
                        Light::Directional {
                            position,
                            intensity,
                            ..
                        } => {
                            ui.label(format!(
                                "Directional {intensity:.2} at ({:.0}, {:.0}, {:.0})",
                                position.x, position.y, position.z
                            ));
                        }
                    }
                }
                ui.separator();

                let mut paused = self.scene.is_paused();
                if ui.checkbox(&mut paused, "Paused (Space)").changed() {
                    self.scene.set_paused(paused);
                }
                let mut axes = self.scene.axes().visible;
                if ui.checkbox(&mut axes, "Axes (A)").changed() {
                    self.scene.set_axes_visible(axes);
                }
                let mut grid = self.scene.grid().visible;
                if ui.checkbox(&mut grid, "Grid (G)").changed() {
                    self.scene.set_grid_visible(grid);
                }
                if ui.button("Reset Camera (R)").clicked() {
                    self.camera.reset();
                }

                ui.separator();
                ui.small("LMB: Orbit | RMB: Pan | Wheel: Zoom | F1: Toggle Overlay");
            });
    }
}

fn key_from(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyR => Key::R,
        KeyCode::Space => Key::Space,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyG => Key::G,
        KeyCode::F1 => Key::F1,
        _ => Key::Other,
    }
}

fn pointer_from(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Window, surface and everything drawn into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        size: PhysicalSize<u32>,
        scene: &Scene,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Cube Scene")
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubescene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_egui(
        &mut self,
        view: &wgpu::TextureView,
        ctx: &EguiContext,
        full_output: egui::FullOutput,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    initial_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(scene: Scene, width: u32, height: u32) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        Self {
            state: AppState::new(scene, aspect),
            initial_size: PhysicalSize::new(width, height),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    /// Acquire the next surface texture, then advance the scene. A frame
    /// that cannot be acquired leaves the scene untouched.
    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                match surface_recovery(&e) {
                    SurfaceRecovery::Reconfigure => {
                        gpu.surface.configure(&gpu.device, &gpu.config);
                    }
                    SurfaceRecovery::Skip => tracing::error!("surface error: {e}"),
                }
                gpu.window.request_redraw();
                return;
            }
        };

        self.state.update();

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.scene,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.draw_egui(&view, &self.egui_ctx, full_output);

        output.present();
        gpu.window.request_redraw();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    Skip,
}

fn surface_recovery(err: &wgpu::SurfaceError) -> SurfaceRecovery {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        _ => SurfaceRecovery::Skip,
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, self.initial_size, &self.state.scene, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to start renderer: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }
        let viewport_height = gpu.config.height as f32;

        match event {
            WindowEvent::CloseRequested => {
                if let Some(node) = self.state.scene.unmount() {
                    tracing::debug!(node = %node.id.short(), "scene torn down");
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.camera.aspect = gpu.aspect();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.apply(map_key(key_from(code)), viewport_height);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = pointer_from(button) {
                    match state {
                        ElementState::Pressed => self.state.input.press(button),
                        ElementState::Released => self.state.input.release(button),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .state
                    .input
                    .cursor_moved(position.x as f32, position.y as f32);
                self.state.apply(action, viewport_height);
            }
            WindowEvent::CursorLeft { .. } => self.state.input.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let action = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => self.state.input.wheel_lines(lines),
                    MouseScrollDelta::PixelDelta(pos) => {
                        self.state.input.wheel_pixels(pos.y as f32)
                    }
                };
                self.state.apply(action, viewport_height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubescene-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let mut scene = Scene::from_config(&config).context("building scene")?;
    scene.mount();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene, cli.width.max(1), cli.height.max(1));
    event_loop.run_app(&mut app)?;

    Ok(())
}
