use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use playstage_assets::TextureCache;
use playstage_author::{EditorSurface, spawn_demo_scene};
use playstage_common::{Rect, WorldBounds};
use playstage_ecs::Role;
use playstage_input::{InputEvent, InputState, Key, PointerButton};
use playstage_kernel::World;
use playstage_render::{DrawSurface, SceneRenderer};
use playstage_render_wgpu::WgpuSurface;
use playstage_tools::SceneInspector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Player steering speed in world units per second.
const PLAYER_SPEED: f32 = 200.0;

/// Margin around the editor panel, in output pixels.
const PANEL_MARGIN: f32 = 16.0;

#[derive(Parser)]
#[command(name = "playstage-desktop", about = "Playstage desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World width in units (also the initial window width in pixels)
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// World height in units (also the initial window height in pixels)
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Frame-rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Directory searched for demo textures
    #[arg(long, default_value = "assets")]
    asset_dir: PathBuf,

    /// Seed for collectible/hazard placement
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Frame pacing: measures per-iteration delta time and blocks out the
/// remainder of the frame budget.
///
/// This is a frame-rate cap, not a fixed-timestep accumulator, so the
/// measured delta is not perfectly uniform across runs.
struct FrameLimiter {
    budget: Duration,
    frame_start: Instant,
    last_start: Instant,
}

impl FrameLimiter {
    fn new(target_fps: u32) -> Self {
        let now = Instant::now();
        Self {
            budget: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            frame_start: now,
            last_start: now,
        }
    }

    /// Start an iteration; returns the elapsed time since the previous
    /// iteration start, capped so a stall cannot produce a huge step.
    fn begin(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_start).as_secs_f32().min(0.1);
        self.last_start = now;
        self.frame_start = now;
        dt
    }

    /// Block for whatever remains of the frame budget.
    fn wait(&self) {
        let elapsed = self.frame_start.elapsed();
        if elapsed < self.budget {
            std::thread::sleep(self.budget - elapsed);
        }
    }
}

/// The editor panel: a shrunk world view in the bottom-right corner.
fn panel_rect(output_w: f32, output_h: f32) -> Rect {
    let w = (output_w / 3.0).floor();
    let h = (output_h / 3.0).floor();
    Rect::new(
        output_w - w - PANEL_MARGIN,
        output_h - h - PANEL_MARGIN,
        w,
        h,
    )
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyR => Key::R,
        _ => return None,
    })
}

/// Engine state independent of the GPU surface.
struct AppState {
    world: World,
    editor: EditorSurface,
    cache: TextureCache,
    input: InputState,
    renderer: SceneRenderer,
    bounds: WorldBounds,
    rng: StdRng,
    limiter: FrameLimiter,
    asset_dir: PathBuf,
    score: u32,
    playing: bool,
    show_panel: bool,
    title_dirty: bool,
}

impl AppState {
    fn new(cli: &Cli) -> Self {
        let bounds = WorldBounds::new(cli.width as f32, cli.height as f32);
        let mut world = World::new();
        let mut editor = EditorSurface::new();
        let mut cache = TextureCache::new();
        let mut rng = StdRng::seed_from_u64(cli.seed);

        spawn_demo_scene(
            &mut world,
            &mut editor,
            &mut cache,
            &cli.asset_dir,
            bounds,
            &mut rng,
        );
        tracing::info!("{}", SceneInspector::summary(&world));

        Self {
            world,
            editor,
            cache,
            input: InputState::new(),
            renderer: SceneRenderer::new(bounds),
            bounds,
            rng,
            limiter: FrameLimiter::new(cli.fps),
            asset_dir: cli.asset_dir.clone(),
            score: 0,
            playing: false,
            show_panel: true,
            title_dirty: true,
        }
    }

    fn respawn(&mut self) {
        spawn_demo_scene(
            &mut self.world,
            &mut self.editor,
            &mut self.cache,
            &self.asset_dir,
            self.bounds,
            &mut self.rng,
        );
        self.score = 0;
        self.title_dirty = true;
    }

    /// Edge-triggered editor commands; held-key steering reads the
    /// persistent input state during the frame instead.
    fn handle_key_pressed(&mut self, key: Key) {
        match key {
            Key::Space => {
                self.playing = !self.playing;
                self.title_dirty = true;
                tracing::info!(playing = self.playing, "play mode toggled");
            }
            Key::Tab => {
                self.show_panel = !self.show_panel;
            }
            Key::R => {
                self.respawn();
            }
            Key::Delete | Key::Backspace => {
                if let Some(id) = self.editor.delete_selected(&mut self.world) {
                    tracing::info!(%id, "deleted via editor");
                }
            }
            Key::Escape => {
                self.editor.clear_selection();
            }
            _ => {}
        }
    }

    /// One engine-loop iteration against an acquired surface: simulate if
    /// playing, draw the full window plus the editor panel, present, then
    /// hold the frame cap.
    fn frame(&mut self, surface: &mut WgpuSurface) {
        let dt = self.limiter.begin();
        self.editor.prune_dead(&self.world);

        if self.playing {
            if let Some(player) = self.world.find_role(Role::Player) {
                let axis = self.input.axis();
                if let Some(v) = self.world.velocity_mut(player) {
                    v.vx = axis.x * PLAYER_SPEED;
                    v.vy = axis.y * PLAYER_SPEED;
                }
            }
            let report = playstage_sim::run_frame(
                &mut self.world,
                self.bounds,
                dt,
                &mut self.score,
                &mut self.rng,
            );
            if report.collected || report.struck {
                self.title_dirty = true;
            }
        }

        surface.sync_textures(&self.cache);

        let (w, h) = surface.size();
        let full = Rect::new(0.0, 0.0, w as f32, h as f32);
        self.renderer
            .draw_world_into(surface, &self.world, self.editor.selection(), full);

        if self.show_panel {
            let panel = panel_rect(w as f32, h as f32);
            self.renderer
                .draw_world_into(surface, &self.world, self.editor.selection(), panel);
            self.editor.set_panel(panel, self.bounds);
        } else {
            // With the panel hidden, gestures map against the full-window
            // view, which is the last rectangle the bridge drew into.
            self.editor.set_panel(full, self.bounds);
        }

        surface.present();
        self.limiter.wait();
    }

    fn title(&self) -> String {
        format!(
            "Playstage | score {} | {}",
            self.score,
            if self.playing { "playing" } else { "paused" }
        )
    }
}

struct App {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<WgpuSurface>,
    initial_size: PhysicalSize<u32>,
}

impl App {
    fn new(cli: &Cli) -> Self {
        Self {
            state: AppState::new(cli),
            window: None,
            surface: None,
            initial_size: PhysicalSize::new(cli.width, cli.height),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.state.title())
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        // Subsystem bring-up is the sole fatal category.
        let surface = WgpuSurface::new(window.clone()).expect("initialize GPU surface");

        self.window = Some(window);
        self.surface = Some(surface);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.state.input.apply(&InputEvent::Quit);
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(surface) = &mut self.surface {
                    surface.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let Some(key) = map_key(code) else {
                    return;
                };
                if key_state == ElementState::Pressed {
                    self.state.input.apply(&InputEvent::KeyDown(key));
                    if !repeat {
                        self.state.handle_key_pressed(key);
                    }
                } else {
                    self.state.input.apply(&InputEvent::KeyUp(key));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.state.input.apply(&InputEvent::PointerMoved(pos));
                if self.state.input.is_button_down(PointerButton::Primary) {
                    self.state.editor.pointer_dragged(&mut self.state.world, pos);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let pos = self.state.input.pointer();
                if btn_state == ElementState::Pressed {
                    self.state
                        .input
                        .apply(&InputEvent::PointerDown(PointerButton::Primary, pos));
                    self.state.editor.pointer_pressed(&self.state.world, pos);
                } else {
                    self.state
                        .input
                        .apply(&InputEvent::PointerUp(PointerButton::Primary, pos));
                    self.state.editor.pointer_released();
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(surface) = &mut self.surface else {
                    return;
                };
                self.state.frame(surface);

                if self.state.title_dirty {
                    if let Some(window) = &self.window {
                        window.set_title(&self.state.title());
                    }
                    self.state.title_dirty = false;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("playstage-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_enforces_the_frame_budget() {
        let mut limiter = FrameLimiter::new(50); // 20 ms budget
        limiter.begin();
        limiter.wait();
        assert!(limiter.frame_start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn limiter_delta_is_bounded() {
        let mut limiter = FrameLimiter::new(60);
        std::thread::sleep(Duration::from_millis(2));
        let dt = limiter.begin();
        assert!(dt > 0.0);
        assert!(dt <= 0.1);
    }

    #[test]
    fn panel_sits_inside_the_output() {
        let panel = panel_rect(800.0, 600.0);
        assert!(panel.x >= 0.0 && panel.y >= 0.0);
        assert!(panel.right() <= 800.0);
        assert!(panel.bottom() <= 600.0);
        assert!(!panel.is_empty());
    }

    #[test]
    fn steering_keys_are_mapped() {
        for code in [
            KeyCode::KeyW,
            KeyCode::ArrowLeft,
            KeyCode::Space,
            KeyCode::Tab,
            KeyCode::Delete,
        ] {
            assert!(map_key(code).is_some());
        }
        assert!(map_key(KeyCode::F24).is_none());
    }
}
