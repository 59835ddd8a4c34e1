//! Tetra4D - interactive 4D shadow visualizer
//!
//! Renders true 4D scenes of tetrahedral meshes with per-tetrahedron
//! alias-free shadow hypervolumes, through a first-person 4D camera.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use tetra4d::config::AppConfig;
use tetra4d::demo;
use tetra4d::input::{InputAction, InputMapper, InputState};
use tetra4d_core::{Scene, ShadowGeometry};
use tetra4d_math::Vec4;
use tetra4d_render::{
    context::RenderContext,
    deferred::{
        perspective_matrix, GBuffer, GeometryPipeline, ObjectUniforms, ShadingPipeline,
        ShadingUniforms,
    },
    Camera4, GpuMesh, ShadowHypervolumes, ShadowUniforms,
};

/// Render error types
#[derive(Debug)]
enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// GPU state: context, G-buffer, shadow computer, and both render passes.
struct Renderer {
    context: RenderContext,
    gbuffer: GBuffer,
    geometry_pipeline: GeometryPipeline,
    shading_pipeline: ShadingPipeline,
    shadow: ShadowHypervolumes,
    shading_bind_group: wgpu::BindGroup,
    /// One uploaded mesh per scene geometry, indexed by `GeometryId`
    meshes: Vec<GpuMesh>,
}

impl Renderer {
    fn new(
        window: Arc<Window>,
        config: &AppConfig,
        scene: &Scene,
        shadow_geometry: &ShadowGeometry,
    ) -> Self {
        let context = pollster::block_on(RenderContext::with_vsync(
            window,
            config.window.vsync,
        ));
        let (width, height) = (context.size.width.max(1), context.size.height.max(1));

        let gbuffer = GBuffer::new(&context.device, width, height);
        let geometry_pipeline = GeometryPipeline::new(&context.device, scene.node_count() as u32);
        let shading_pipeline = ShadingPipeline::new(&context.device, context.config.format);
        let shadow = ShadowHypervolumes::new(
            &context.device,
            width,
            height,
            &gbuffer.position_view,
            shadow_geometry,
            scene.node_count(),
        );
        let shading_bind_group =
            shading_pipeline.create_bind_group(&context.device, &gbuffer, shadow.shadow_bits());

        let meshes = scene
            .geometries()
            .map(|geometry| GpuMesh::new(&context.device, geometry))
            .collect();

        Self {
            context,
            gbuffer,
            geometry_pipeline,
            shading_pipeline,
            shadow,
            shading_bind_group,
            meshes,
        }
    }

    /// Recreate every screen-sized resource.
    fn resize(
        &mut self,
        new_size: winit::dpi::PhysicalSize<u32>,
        scene: &Scene,
        shadow_geometry: &ShadowGeometry,
    ) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.gbuffer = GBuffer::new(&self.context.device, new_size.width, new_size.height);
        self.shadow.reinit(
            &self.context.device,
            new_size.width,
            new_size.height,
            &self.gbuffer.position_view,
            shadow_geometry,
            scene.node_count(),
        );
        self.shading_bind_group = self.shading_pipeline.create_bind_group(
            &self.context.device,
            &self.gbuffer,
            self.shadow.shadow_bits(),
        );
    }

    /// Draw one frame: geometry pass, shadow phases, shading pass.
    fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &Camera4,
        light_pos: Vec4,
        config: &AppConfig,
    ) -> Result<(), RenderError> {
        let view = camera.view_transform();
        let projection = perspective_matrix(
            config.camera.fov.to_radians(),
            self.context.aspect_ratio(),
            config.camera.near,
            config.camera.far,
        );

        // Per-object uniforms and draw list share one traversal.
        let mut uniforms = Vec::new();
        let mut draws = Vec::new();
        scene.visit(|_, node, world| {
            let geometry = match node.geometry {
                Some(id) if node.visible => id,
                _ => return,
            };
            let model_view = world.chain(&view);
            uniforms.push(ObjectUniforms::new(
                model_view.mat,
                model_view.pos,
                projection,
                node.color,
            ));
            draws.push(&self.meshes[geometry.index()]);
        });
        self.geometry_pipeline
            .write_objects(&self.context.queue, &uniforms);

        self.shadow.write_uniforms(
            &self.context.queue,
            &ShadowUniforms::new(view.mat, view.pos, light_pos),
        );
        self.shading_pipeline.write_uniforms(
            &self.context.queue,
            &ShadingUniforms {
                light_pos: view.apply(light_pos).to_array(),
                light_color: [
                    config.light.color[0],
                    config.light.color[1],
                    config.light.color[2],
                    1.0,
                ],
                light_params: [config.light.radius, config.light.intensity, config.light.ambient, 0.0],
                screen_size: [self.context.size.width, self.context.size.height],
                _padding: [0; 2],
            },
        );

        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        // Pass order on one encoder doubles as the memory barriers between
        // G-buffer, reduction, shadow test, and shading.
        self.geometry_pipeline
            .render(&mut encoder, &self.gbuffer, &draws);
        self.shadow.precompute(&mut encoder);
        let (model_matrices, model_translations) = scene.collect_model_transforms();
        self.shadow.compute(
            &self.context.queue,
            &mut encoder,
            &model_matrices,
            &model_translations,
        );
        self.shading_pipeline
            .render(&mut encoder, &surface_view, &self.shading_bind_group);

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Main application state
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    /// Static shadow-casting geometry, collected once at startup
    shadow_geometry: ShadowGeometry,
    camera: Camera4,
    input: InputState,
    start: std::time::Instant,
    last_frame: std::time::Instant,
    cursor_captured: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let scene = demo::build_scene();
        let shadow_geometry = scene.collect_shadow_geometry();

        let mut camera = Camera4::new();
        camera.transform.pos = Vec4::from(config.camera.start_position);
        camera.speed = config.input.move_speed;
        camera.rotation_divisor = config.input.rotation_divisor;
        camera.zw_speed = config.input.zw_speed;

        let now = std::time::Instant::now();
        Self {
            config,
            window: None,
            renderer: None,
            scene,
            shadow_geometry,
            camera,
            input: InputState::new(),
            start: now,
            last_frame: now,
            cursor_captured: false,
        }
    }

    /// Light position for this frame, in world space.
    fn light_position(&self) -> Vec4 {
        if self.config.light.animate {
            let t = self.start.elapsed().as_secs_f32();
            Vec4::new(
                t.sin() * 2.0,
                (t * 1.5).sin() * 1.5 + 2.0,
                0.0,
                t.cos() * 2.0,
            )
        } else {
            Vec4::from(self.config.light.position)
        }
    }

    /// Capture cursor for FPS-style controls
    fn capture_cursor(&mut self) {
        if let Some(window) = &self.window {
            let grab_result = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

            if grab_result.is_ok() {
                window.set_cursor_visible(false);
                self.cursor_captured = true;
                log::info!("Cursor captured - Escape to release");
            } else {
                log::warn!("Failed to capture cursor");
            }
        }
    }

    /// Release cursor
    fn release_cursor(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
            self.cursor_captured = false;
            log::info!("Cursor released - click to capture");
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::ToggleCursor => {
                if self.cursor_captured {
                    self.release_cursor();
                } else {
                    self.capture_cursor();
                }
            }
            InputAction::Exit => event_loop.exit(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    let new_fullscreen = if window.fullscreen().is_some() {
                        None
                    } else {
                        Some(Fullscreen::Borderless(None))
                    };
                    window.set_fullscreen(new_fullscreen);
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title(&self.config.window.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                ))
                .with_fullscreen(
                    self.config
                        .window
                        .fullscreen
                        .then(|| Fullscreen::Borderless(None)),
                );

            let window = Arc::new(
                event_loop
                    .create_window(window_attributes)
                    .expect("Failed to create window"),
            );

            let renderer = Renderer::new(
                window.clone(),
                &self.config,
                &self.scene,
                &self.shadow_geometry,
            );

            log::info!(
                "scene ready: {} tetrahedra, {} shadow-casting cells",
                self.scene.tetrahedron_count(),
                self.shadow_geometry.cell_count()
            );

            self.window = Some(window);
            self.renderer = Some(renderer);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size, &self.scene, &self.shadow_geometry);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) =
                        InputMapper::map_keyboard(key, event.state, self.cursor_captured)
                    {
                        self.handle_action(action, event_loop);
                        return;
                    }
                    self.input.process_keyboard(key, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(action) =
                    InputMapper::map_mouse_button(button, state, self.cursor_captured)
                {
                    self.handle_action(action, event_loop);
                }
            }

            WindowEvent::RedrawRequested => {
                let now = std::time::Instant::now();
                // Cap dt to avoid huge jumps after focus loss
                let dt = (now - self.last_frame).as_secs_f32().min(1.0 / 30.0);
                self.last_frame = now;

                let frame_input = self.input.frame_input(self.cursor_captured);
                self.camera.update(&frame_input, dt);

                if self.config.debug.show_overlay {
                    if let Some(window) = &self.window {
                        let pos = self.camera.transform.pos;
                        let hint = if self.cursor_captured {
                            "Esc to release"
                        } else {
                            "Click to capture"
                        };
                        window.set_title(&format!(
                            "{} - ({:.1}, {:.1}, {:.1}, {:.1}) [{}]",
                            self.config.window.title, pos.x, pos.y, pos.z, pos.w, hint
                        ));
                    }
                }

                let light_pos = self.light_position();
                if let Some(renderer) = &mut self.renderer {
                    match renderer.render_frame(&self.scene, &self.camera, light_pos, &self.config)
                    {
                        Ok(()) => {}
                        Err(RenderError::SurfaceLost) => {
                            let size = renderer.context.size;
                            renderer.resize(size, &self.scene, &self.shadow_geometry);
                        }
                        Err(RenderError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            event_loop.exit();
                            return;
                        }
                        Err(e) => {
                            log::warn!("{}", e);
                        }
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta.0, delta.1);
        }
    }
}

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.debug.log_level),
    )
    .init();
    log::info!("Starting Tetra4D");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
