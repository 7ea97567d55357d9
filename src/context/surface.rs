use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{debug, info, warn};
use raw_window_handle::HasRawWindowHandle;
use std::{ffi::CString, num::NonZeroU32, ptr};
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use super::hints::{ContextHints, Profile};
use super::BootstrapError;
use crate::render::native::{missing_entry_points, NativeGl};

/// Window and context parameters for [`RenderSurface::create`].
#[derive(Debug, Clone)]
pub struct SurfaceRequest<'a> {
    pub width: u32,
    pub height: u32,
    pub title: &'a str,
    pub vsync: bool,
    pub hints: ContextHints,
}

/// The window, its GL surface and the context current on this thread.
///
/// Field order is drop order: context, then surface, then window.
pub struct RenderSurface {
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    window: Window,
}

impl RenderSurface {
    /// Creates the window and a context matching `request.hints`, and makes
    /// the context current.
    pub fn create(
        event_loop: &EventLoop<()>,
        request: &SurfaceRequest<'_>,
    ) -> Result<Self, BootstrapError> {
        let hints = request.hints;
        info!(
            "Creating {}x{} window '{}' with OpenGL {} {} context{}",
            request.width,
            request.height,
            request.title,
            hints.version,
            hints.profile,
            if hints.forward_compatible {
                " (forward compatible)"
            } else {
                ""
            }
        );

        let window_builder = WindowBuilder::new()
            .with_title(request.title)
            .with_inner_size(LogicalSize::new(request.width, request.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(event_loop, template, pick_config)
            .map_err(|e| BootstrapError::SurfaceCreation(format!("window: {e}")))?;

        let window = window.ok_or_else(|| {
            BootstrapError::SurfaceCreation("display did not create a window".into())
        })?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                hints.version.major,
                hints.version.minor,
            ))))
            .with_profile(gl_profile(hints.profile))
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| {
                BootstrapError::SurfaceCreation(format!("OpenGL {} context: {e}", hints.version))
            })?;

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .map_err(|e| BootstrapError::SurfaceCreation(format!("window surface: {e}")))?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(|e| BootstrapError::SurfaceCreation(format!("make current: {e}")))?;

        if request.vsync {
            let interval = SwapInterval::Wait(NonZeroU32::MIN);
            if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
                warn!("Failed to enable vsync: {}", e);
            }
        }

        Ok(Self {
            gl_context,
            gl_surface,
            window,
        })
    }

    /// Loads the `gl` function table through this context and hands out the
    /// backend that uses it.
    pub fn load_functions(&self) -> Result<NativeGl, BootstrapError> {
        let gl_display = self.gl_context.display();

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()),
            Err(_) => ptr::null(),
        });

        if let Some(err) = BootstrapError::unresolved(&missing_entry_points()) {
            return Err(err);
        }

        debug!("OpenGL function table loaded");
        // Context was made current in `create` and every entry point we use resolved.
        Ok(unsafe { NativeGl::assume_current() })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the GL surface. Returns `false` for a zero-sized (minimized) window.
    pub fn resize(&self, size: PhysicalSize<u32>) -> bool {
        match (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            (Some(width), Some(height)) => {
                self.gl_surface.resize(&self.gl_context, width, height);
                true
            }
            _ => false,
        }
    }

    pub fn swap_buffers(&self) -> glutin::error::Result<()> {
        self.gl_surface.swap_buffers(&self.gl_context)
    }
}

fn gl_profile(profile: Profile) -> GlProfile {
    match profile {
        Profile::Core => GlProfile::Core,
        Profile::Compatibility => GlProfile::Compatibility,
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("display offered no OpenGL configs")
}
