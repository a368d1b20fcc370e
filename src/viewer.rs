//! Interactive window for a [`Scene`].
//!
//! ```ignore
//! Viewer::new(SceneConfig::default())
//!     .with_title("Grand Tree")
//!     .run()?;
//! ```
//!
//! Controls: Space or Enter toggles the mode, left-drag orbits, the wheel
//! zooms, Escape quits.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::ViewerError;
use crate::gpu::{OrbitCamera, Renderer};
use crate::mode::Mode;
use crate::scene::Scene;
use crate::time::FrameClock;

/// Window builder and runner.
pub struct Viewer {
    config: SceneConfig,
    title: String,
}

impl Viewer {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            title: "Grand Tree".to_string(),
        }
    }

    /// Prefix for the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the scene and run until the window is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        let scene = Scene::new(self.config)?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(scene, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn window_title(prefix: &str, mode: Mode) -> String {
    format!("{} | {} | Space: {}", prefix, mode, mode.action_label())
}

/// What the frame loop does after a failed render.
#[derive(Debug)]
enum SurfaceAction {
    Reconfigure,
    Skip(wgpu::SurfaceError),
    Fatal(ViewerError),
}

fn surface_action(err: wgpu::SurfaceError) -> SurfaceAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceAction::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceAction::Fatal(err.into()),
        other => SurfaceAction::Skip(other),
    }
}

struct App {
    title: String,
    scene: Scene,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    camera: OrbitCamera,
    clock: FrameClock,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    /// First fatal error raised inside a callback.
    error: Option<ViewerError>,
}

impl App {
    fn new(scene: Scene, title: String) -> Self {
        Self {
            title,
            scene,
            window: None,
            renderer: None,
            camera: OrbitCamera::default(),
            clock: FrameClock::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        tracing::error!(error = %err, "viewer stopping");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let attrs = Window::default_attributes()
            .with_title(window_title(&self.title, self.scene.current_mode()))
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.scene))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn toggle(&mut self) {
        let mode = self.scene.toggle();
        if let Some(window) = &self.window {
            window.set_title(&window_title(&self.title, mode));
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.logical_key {
            Key::Named(NamedKey::Space) | Key::Named(NamedKey::Enter) => self.toggle(),
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame = self.clock.tick();
        let mode = self.scene.update(frame);
        self.camera.update(frame.delta, mode);

        let result = match &mut self.renderer {
            Some(renderer) => renderer.render(&mut self.scene, &self.camera, frame.elapsed),
            None => Ok(()),
        };
        if let Err(err) = result {
            match surface_action(err) {
                SurfaceAction::Reconfigure => {
                    tracing::warn!("surface lost, reconfiguring");
                    if let Some(renderer) = &mut self.renderer {
                        renderer.reconfigure();
                    }
                }
                SurfaceAction::Skip(err) => tracing::warn!(error = ?err, "frame skipped"),
                SurfaceAction::Fatal(fatal) => {
                    self.fail(event_loop, fatal);
                    return;
                }
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        self.camera.orbit(dx, dy);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
