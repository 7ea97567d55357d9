//! Window event loop driving a [`Session`] on the native backend.

use log::{error, info};
use winit::{
    event::{Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::PhysicalKey,
};

use crate::config::AppConfig;
use crate::context::{BootstrapError, RenderSurface, SurfaceRequest};
use crate::demos::Demo;
use crate::engine::{LoopState, Session};
use crate::input::KeyboardState;
use crate::render::native::NativeGl;
use crate::utils::error::{AppError, Result};

struct App {
    // Dropped before `surface` so GL objects go while the context is alive.
    session: Session<NativeGl>,
    keyboard: KeyboardState,
    surface: RenderSurface,
}

impl App {
    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        match event {
            Event::WindowEvent { window_id, event } if window_id == self.surface.window().id() => {
                self.handle_window_event(event, elwt)
            }
            Event::AboutToWait => self.surface.window().request_redraw(),
            Event::LoopExiting => {
                self.session.teardown();
            }
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => self.close(elwt),
            WindowEvent::Resized(size) => {
                if self.surface.resize(size) {
                    self.session.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.keyboard.handle_key(code, state),
            WindowEvent::Focused(false) => self.keyboard.release_all(),
            WindowEvent::RedrawRequested => match self.session.frame(&mut self.keyboard) {
                LoopState::Running => {
                    if let Err(e) = self.surface.swap_buffers() {
                        error!("Failed to present frame: {}", e);
                        self.close(elwt);
                    }
                }
                LoopState::Closing => self.close(elwt),
            },
            _ => {}
        }
    }

    fn close(&mut self, elwt: &EventLoopWindowTarget<()>) {
        if self.session.teardown() {
            info!("Closed after {} frames", self.session.frames());
        }
        elwt.exit();
    }
}

/// Opens the window for `demo`, builds its GPU resources and runs the render
/// loop until the window is closed or Escape is pressed.
pub fn run(demo: &Demo, config: &AppConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| BootstrapError::SurfaceCreation(format!("event loop: {e}")))?;

    let title = config.window.title.as_deref().unwrap_or(demo.title);
    let request = SurfaceRequest {
        width: config.window.width,
        height: config.window.height,
        title,
        vsync: config.window.vsync,
        hints: config.context_hints(),
    };

    let surface = RenderSurface::create(&event_loop, &request)?;
    let gl = surface.load_functions()?;
    let mut session = Session::new(gl, demo)?;

    let size = surface.window().inner_size();
    session.resize(size.width, size.height);

    if let Some(usage) = demo.usage {
        println!("{usage}");
    }
    info!("Running demo '{}'", demo.name);

    let mut app = App {
        session,
        keyboard: KeyboardState::default(),
        surface,
    };

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, elwt| app.handle_event(event, elwt))
        .map_err(|e| AppError::EventLoop(e.to_string()))
}
