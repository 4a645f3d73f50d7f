use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use meadow_input::{Action, Direction, HeldKeys};
use meadow_kernel::{SeededSource, WorldGenerator};
use meadow_persist::{FileBlobStore, SessionConfig, SessionStore};
use meadow_render::{FollowCamera, Scene};
use meadow_render_wgpu::WgpuRenderer;
use meadow_tools::SessionInspector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

/// Minimum time between two grid toggles from the on-screen button.
const GRID_TOGGLE_LOCKOUT: Duration = Duration::from_millis(300);
/// Pixel-equivalent wheel delta of one scroll line.
const PIXELS_PER_LINE: f32 = 4.0;

#[derive(Parser)]
#[command(name = "meadow-desktop", about = "Meadow sandbox desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session data directory
    #[arg(long, default_value = "./meadow_data")]
    data_dir: PathBuf,

    /// Session config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible fresh world
    #[arg(long)]
    seed: Option<u64>,

    /// Number of plants in a fresh world
    #[arg(long, allow_negative_numbers = true)]
    plants: Option<i64>,
}

fn open_session(cli: &Cli) -> Result<SessionStore<FileBlobStore>> {
    let mut config = SessionConfig::load_or_default(cli.config.as_deref())?;
    if let Some(count) = cli.plants {
        config.generator = config.generator.with_count(count)?;
    }
    let storage = FileBlobStore::open(&cli.data_dir)
        .with_context(|| format!("opening data dir {}", cli.data_dir.display()))?;
    let source = cli
        .seed
        .map_or_else(SeededSource::from_entropy, SeededSource::seeded);
    let mut generator = WorldGenerator::new(source);
    Ok(SessionStore::startup(storage, &config, &mut generator)?)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Browser-style wheel delta: positive when scrolling down, which zooms out.
fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::KeyW => Some(Direction::Forward),
        KeyCode::KeyS => Some(Direction::Back),
        KeyCode::KeyA => Some(Direction::Left),
        KeyCode::KeyD => Some(Direction::Right),
        _ => None,
    }
}

/// Drops repeated triggers that arrive within the lockout.
#[derive(Debug)]
struct Debounce {
    lockout: Duration,
    last: Option<Instant>,
}

impl Debounce {
    fn new(lockout: Duration) -> Self {
        Self {
            lockout,
            last: None,
        }
    }

    fn try_fire(&mut self, now: Instant) -> bool {
        if self
            .last
            .is_some_and(|last| now.saturating_duration_since(last) < self.lockout)
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// Application state.
struct AppState {
    session: SessionStore<FileBlobStore>,
    camera: FollowCamera,
    keys: HeldKeys,
    show_grid: bool,
    grid_toggle: Debounce,
    show_inspector: bool,
}

impl AppState {
    fn new(session: SessionStore<FileBlobStore>) -> Self {
        let mut camera = FollowCamera::default();
        camera.follow(Vec3::from(session.state().player_position()));
        Self {
            session,
            camera,
            keys: HeldKeys::new(),
            show_grid: false,
            grid_toggle: Debounce::new(GRID_TOGGLE_LOCKOUT),
            show_inspector: false,
        }
    }

    /// Per-frame update: movement, save cadence, camera.
    fn update(&mut self) {
        if let Some(action) = Action::from_held(&self.keys) {
            self.apply(action);
        }
        if let Err(e) = self.session.tick(now_ms()) {
            tracing::warn!("session save failed, will retry: {e}");
        }
        self.camera
            .follow(Vec3::from(self.session.state().player_position()));
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Move(delta) => self.session.record_player_movement(delta),
            Action::Zoom(delta_y) => {
                if !self.camera.zoom(delta_y) {
                    tracing::trace!(delta_y, "zoom step out of range");
                }
            }
            Action::ToggleGrid => {
                if self.grid_toggle.try_fire(Instant::now()) {
                    self.show_grid = !self.show_grid;
                    tracing::debug!(show_grid = self.show_grid, "grid toggled");
                }
            }
            // Needs the window; handled by the app.
            Action::ToggleFullscreen => {}
        }
    }

    fn shutdown(&mut self) {
        match self.session.flush() {
            Ok(()) => tracing::info!("session saved on exit"),
            Err(e) => tracing::error!("failed to save session on exit: {e}"),
        }
    }

    /// Draw the overlay. Returns the action triggered by a button, if any.
    fn draw_ui(&mut self, ctx: &EguiContext) -> Option<Action> {
        let mut action = None;

        egui::Area::new(egui::Id::new("grid_toggle"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .show(ctx, |ui| {
                let label = if self.show_grid { "Hide Grid" } else { "Show Grid" };
                if ui.button(label).clicked() {
                    action = Some(Action::ToggleGrid);
                }
            });

        if !self.show_inspector {
            return action;
        }

        let summary = SessionInspector::summary(self.session.state());

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Meadow");
                ui.separator();
                let p = summary.player_position;
                ui.label(format!("Player: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Plants: {}  (trees {}, bushes {}, flowers {})",
                    summary.plant_count, summary.trees, summary.bushes, summary.flowers
                ));
                ui.label(format!("Origin: {:?}", self.session.origin()));
                ui.label(format!("Camera distance: {:.1}", self.camera.distance));
                if let Some(nearest) = SessionInspector::nearest_plant(self.session.state()) {
                    ui.label(format!(
                        "Nearest: {} at {:.1}",
                        nearest.kind, nearest.ground_distance
                    ));
                }
                ui.separator();

                ui.heading("Plants");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for info in SessionInspector::list_plants(self.session.state()) {
                        ui.monospace(info.to_string());
                    }
                });

                ui.separator();
                ui.small("F1: Inspector | F11: Fullscreen | WASD: Move | Wheel: Zoom");
            });

        action
    }
}

/// Window and GPU resources, created once the event loop resumes.
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
    fn init(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Meadow")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("meadow_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

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

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

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

    fn toggle_fullscreen(&self) {
        let next = match self.window.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        self.window.set_fullscreen(next);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(session: SessionStore<FileBlobStore>) -> Self {
        Self {
            state: AppState::new(session),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::ToggleFullscreen => {
                if let Some(gpu) = &self.gpu {
                    gpu.toggle_fullscreen();
                }
            }
            other => self.state.apply(other),
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(direction) = direction_for(key) {
            self.state.keys.set(direction, pressed);
            return;
        }
        if !pressed {
            return;
        }
        match key {
            KeyCode::F11 => self.apply(Action::ToggleFullscreen),
            KeyCode::F1 => self.state.show_inspector = !self.state.show_inspector,
            _ => {}
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let scene = Scene::compose(self.state.session.state(), self.state.show_grid);
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.camera, &scene);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let mut ui_action = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_action = self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();

        if let Some(action) = ui_action {
            self.apply(action);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::init(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::Focused(false) => {
                self.state.keys.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.apply(Action::Zoom(wheel_delta_y(delta)));
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

    tracing::info!("meadow-desktop starting");

    let session = open_session(&cli)?;
    tracing::info!(
        origin = ?session.origin(),
        key = session.key(),
        "session ready"
    );
    if let Some(e) = session.unsaved_error() {
        tracing::warn!("fresh world not saved yet, will retry while running: {e}");
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(session);
    event_loop.run_app(&mut app)?;

    Ok(())
}
