//! WGPU-based rendering engine
//!
//! Owns the graphics device and everything needed to turn a [`Scene`] into
//! pixels: the surface or headless target, depth and MSAA buffers, the
//! shadow map, the render pipelines and the global uniform buffer. Frames
//! are drawn in up to three passes: shadow depth, main scene (meshes, then
//! blended meshes, then line helpers) and the optional overlay.

use std::sync::Arc;

use wgpu::TextureFormat;

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gfx::resources::{
    global_bindings::{GlobalBindings, GlobalUniform, GlobalUBO},
    material::NodeBindings,
    texture_resource::TextureResource,
};
use crate::gfx::scene::{node::Node, Scene};
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder};

use super::pipeline_manager::{PipelineConfig, PipelineManager, VertexLayout};
use super::screenshot::{padded_bytes_per_row, strip_row_padding};

/// Exponential-squared fog falloff; the fog color follows the background.
const FOG_DENSITY: f32 = 0.1;

/// Where frames end up.
enum RenderTarget {
    /// Onscreen window surface.
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    /// No presentable target; frames are rendered on demand for capture.
    Headless { width: u32, height: u32 },
}

/// Core rendering engine managing GPU resources and draw calls.
pub struct RenderEngine {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    target: RenderTarget,
    format: TextureFormat,
    sample_count: u32,
    depth_texture: TextureResource,
    msaa_texture: Option<TextureResource>,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    node_bindings: NodeBindings,
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,
    white_texture: TextureResource,
    wireframe_supported: bool,
}

impl RenderEngine {
    /// Creates an engine rendering to a window surface.
    pub async fn new_windowed(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &ViewerConfig,
    ) -> Result<Self> {
        Self::new(Some(window.into()), width, height, config).await
    }

    /// Creates an engine with no window; frames are rendered only when a
    /// capture is requested.
    pub async fn new_headless(width: u32, height: u32, config: &ViewerConfig) -> Result<Self> {
        Self::new(None, width, height, config).await
    }

    async fn new(
        surface_target: Option<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &ViewerConfig,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = match surface_target {
            Some(target) => Some(instance.create_surface(target).map_err(|e| {
                ViewerError::InitializationFailed(format!("cannot create surface: {}", e))
            })?),
            None => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| {
                ViewerError::InitializationFailed(format!("no suitable adapter: {}", e))
            })?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features,
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| {
                ViewerError::InitializationFailed(format!("cannot create device: {}", e))
            })?;

        let (target, format) = match surface {
            Some(surface) => {
                let capabilities = surface.get_capabilities(&adapter);
                let format = capabilities
                    .formats
                    .iter()
                    .copied()
                    .find(|f| {
                        matches!(
                            f,
                            TextureFormat::Bgra8Unorm | TextureFormat::Rgba8Unorm
                        )
                    })
                    .unwrap_or(capabilities.formats[0]);

                let surface_config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width,
                    height,
                    present_mode: wgpu::PresentMode::AutoVsync,
                    alpha_mode: capabilities.alpha_modes[0],
                    view_formats: vec![],
                    desired_maximum_frame_latency: 2,
                };
                surface.configure(&device, &surface_config);
                (
                    RenderTarget::Surface {
                        surface,
                        config: surface_config,
                    },
                    format,
                )
            }
            None => (
                RenderTarget::Headless { width, height },
                TextureFormat::Rgba8Unorm,
            ),
        };

        let sample_count = config.multisamples;
        let depth_texture = TextureResource::create_depth_texture(
            &device,
            width,
            height,
            sample_count,
            "Depth Texture",
        );
        let msaa_texture = (sample_count > 1).then(|| {
            TextureResource::create_color_target(
                &device,
                width,
                height,
                format,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
                "MSAA Target",
            )
        });

        let shadow_map = TextureResource::create_shadow_map(&device, config.shadow_map_size);
        let shadow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_depth_2d())
            .next_binding_fragment(binding_types::sampler_comparison())
            .create(&device, "Shadow Bind Group Layout");
        let shadow_bind_group = BindGroupBuilder::new(&shadow_layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(&device, "Shadow Bind Group");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let node_bindings = NodeBindings::new(&device);
        let white_texture = TextureResource::create_white(&device, &queue);

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));
        pipeline_manager.load_shader("lines", include_str!("lines.wgsl"));

        let color_target = wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        };
        let scene_layouts = vec![
            global_bindings.layout().clone(),
            node_bindings.transform_layout.layout.clone(),
            node_bindings.material_layout.layout.clone(),
            shadow_layout.layout.clone(),
        ];

        // Depth-only pass from the shadow caster; no culling, which avoids
        // light leaks through open meshes.
        pipeline_manager.register_pipeline(
            "shadow",
            PipelineConfig::default()
                .with_label("Shadow Pipeline")
                .with_shader("shadow")
                .with_bind_group_layouts(vec![
                    global_bindings.layout().clone(),
                    node_bindings.transform_layout.layout.clone(),
                ])
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(vec![])
                .with_vertex_only(),
        );

        pipeline_manager.register_pipeline(
            "scene",
            PipelineConfig::default()
                .with_label("Scene Pipeline")
                .with_shader("scene")
                .with_bind_group_layouts(scene_layouts.clone())
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_sample_count(sample_count)
                .with_color_targets(vec![Some(color_target.clone())]),
        );

        if wireframe_supported {
            pipeline_manager.register_pipeline(
                "scene-wireframe",
                PipelineConfig::default()
                    .with_label("Scene Wireframe Pipeline")
                    .with_shader("scene")
                    .with_bind_group_layouts(scene_layouts)
                    .with_depth_format(TextureResource::DEPTH_FORMAT)
                    .with_sample_count(sample_count)
                    .with_polygon_mode(wgpu::PolygonMode::Line)
                    .with_color_targets(vec![Some(color_target.clone())]),
            );
        }

        pipeline_manager.register_pipeline(
            "lines",
            PipelineConfig::default()
                .with_label("Line Pipeline")
                .with_shader("lines")
                .with_bind_group_layouts(vec![global_bindings.layout().clone()])
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_sample_count(sample_count)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_vertex_layout(VertexLayout::Lines)
                .with_color_targets(vec![Some(color_target)]),
        );

        Ok(RenderEngine {
            device,
            queue,
            target,
            format,
            sample_count,
            depth_texture,
            msaa_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            node_bindings,
            shadow_map,
            shadow_bind_group,
            white_texture,
            wireframe_supported,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }

    /// Current target dimensions in pixels.
    pub fn size(&self) -> (u32, u32) {
        match &self.target {
            RenderTarget::Surface { config, .. } => (config.width, config.height),
            RenderTarget::Headless { width, height } => (*width, *height),
        }
    }

    /// Creates GPU resources for a freshly appended node.
    pub fn upload_node(&self, node: &mut Node) {
        node.init_gpu_resources(&self.device, &self.node_bindings, &self.white_texture);
    }

    /// Loads an albedo texture from disk and binds it to the node.
    pub fn upload_node_texture(&self, node: &mut Node, path: &std::path::Path) -> Result<()> {
        let texture = TextureResource::from_file(&self.device, &self.queue, path)?;
        node.set_texture(&self.device, &self.node_bindings, texture);
        Ok(())
    }

    /// Resizes the render target, recreating depth and MSAA buffers.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        match &mut self.target {
            RenderTarget::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            RenderTarget::Headless {
                width: w,
                height: h,
            } => {
                *w = width;
                *h = height;
            }
        }

        self.depth_texture = TextureResource::create_depth_texture(
            &self.device,
            width,
            height,
            self.sample_count,
            "Depth Texture",
        );
        if self.sample_count > 1 {
            self.msaa_texture = Some(TextureResource::create_color_target(
                &self.device,
                width,
                height,
                self.format,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
                "MSAA Target",
            ));
        }
    }

    /// Per-frame upload: camera matrices, node transforms/materials, line
    /// buffers and the global uniform buffer.
    pub fn prepare_frame(&mut self, scene: &mut Scene) {
        scene.update();

        if scene.axes.gpu.is_none() {
            scene.axes.init_gpu_resources(&self.device);
        }
        if scene.grid.gpu.is_none() {
            scene.grid.init_gpu_resources(&self.device);
        }
        if scene.floor.gpu.is_none() {
            self.upload_node(&mut scene.floor);
        }
        for node in scene.draw_nodes_mut() {
            node.sync(&self.queue);
        }

        let camera = &scene.camera_manager.camera.uniform;
        let toggles = scene.toggles;
        let background = scene.background;
        let uniform = GlobalUniform {
            view_proj: camera.view_proj,
            view_position: camera.view_position,
            light_view_proj: scene.lights.light_view_proj().into(),
            ambient: scene.lights.gpu_ambient(),
            lights: scene.lights.gpu_lights(),
            fog: [background[0], background[1], background[2], FOG_DENSITY],
            toggles: [
                scene.lights.enabled as u32,
                toggles.shadow as u32,
                toggles.hdr as u32,
                toggles.fog as u32,
            ],
            extra: [toggles.textures as u32, 0, 0, 0],
        };
        self.global_ubo.update_content(&self.queue, uniform);

        // Warm the pipeline cache so encoding can use immutable lookups.
        let mut names = vec!["shadow", "scene", "lines"];
        if toggles.wireframe && self.wireframe_supported {
            names.push("scene-wireframe");
        }
        for name in names {
            self.pipeline_manager.get_pipeline(name);
        }
    }

    /// Renders one frame to the window surface, with an optional overlay
    /// callback drawing on top of the resolved image.
    pub fn render_frame<F>(&mut self, scene: &Scene, overlay_callback: Option<F>) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let acquired = {
            let RenderTarget::Surface { surface, .. } = &self.target else {
                return Ok(());
            };
            surface.get_current_texture()
        };

        let surface_texture = match acquired {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.size();
                self.resize(width, height);
                return Ok(());
            }
            Err(e) => {
                return Err(ViewerError::Graphics(format!(
                    "cannot acquire surface texture: {}",
                    e
                )))
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.encode_scene_passes(&mut encoder, &surface_view, scene);

        if let Some(overlay_callback) = overlay_callback {
            overlay_callback(&self.device, &self.queue, &mut encoder, &surface_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Renders one frame into an offscreen texture and reads it back as a
    /// tight RGBA buffer (top row first). Blocks until the copy completes.
    pub fn capture_frame(&mut self, scene: &Scene) -> Result<Vec<u8>> {
        let (width, height) = self.size();

        let capture = TextureResource::create_color_target(
            &self.device,
            width,
            height,
            self.format,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            "Capture Target",
        );

        let padded_stride = padded_bytes_per_row(width);
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: padded_stride as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });

        self.encode_scene_passes(&mut encoder, &capture.view, scene);

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &capture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_stride),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        // Create the mapping, then poll the device before awaiting, or the
        // callback never fires.
        let slice = readback_buffer.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::MaintainBase::Wait);

        match pollster::block_on(receiver.receive()) {
            Some(Ok(())) => {}
            _ => {
                return Err(ViewerError::Graphics(
                    "capture readback mapping failed".into(),
                ))
            }
        }

        let mut pixels = {
            let data = slice.get_mapped_range();
            strip_row_padding(&data, width, height)
        };
        readback_buffer.unmap();

        self.to_rgba(&mut pixels)?;
        Ok(pixels)
    }

    /// Normalizes captured bytes to RGBA channel order.
    fn to_rgba(&self, pixels: &mut [u8]) -> Result<()> {
        match self.format {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => Ok(()),
            TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => {
                for pixel in pixels.chunks_exact_mut(4) {
                    pixel.swap(0, 2);
                }
                Ok(())
            }
            other => Err(ViewerError::Graphics(format!(
                "cannot capture from surface format {:?}",
                other
            ))),
        }
    }

    /// Encodes the shadow and main passes for one frame.
    fn encode_scene_passes(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        scene: &Scene,
    ) {
        // PASS 1: shadow depth from the primary light
        if scene.toggles.shadow {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get("shadow") {
                shadow_pass.set_pipeline(pipeline);
                shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                for node in scene.draw_nodes() {
                    Self::draw_node(&mut shadow_pass, node, false);
                }
            }
        }

        // PASS 2: main scene into the (possibly multisampled) color target
        {
            let (view, resolve_target) = match &self.msaa_texture {
                Some(msaa) => (&msaa.view, Some(color_view)),
                None => (color_view, None),
            };
            let [r, g, b] = scene.background;

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let scene_pipeline = if scene.toggles.wireframe && self.wireframe_supported {
                self.pipeline_manager.get("scene-wireframe")
            } else {
                self.pipeline_manager.get("scene")
            };

            if let Some(pipeline) = scene_pipeline {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(3, &self.shadow_bind_group, &[]);

                // opaque first, blended after
                for node in scene.draw_nodes().filter(|n| !n.is_transparent()) {
                    Self::draw_node(&mut render_pass, node, true);
                }
                for node in scene.draw_nodes().filter(|n| n.is_transparent()) {
                    Self::draw_node(&mut render_pass, node, true);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get("lines") {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                for lines in [&scene.axes, &scene.grid] {
                    if !lines.visible {
                        continue;
                    }
                    if let Some(gpu) = &lines.gpu {
                        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                        render_pass.draw(0..gpu.vertex_count, 0..1);
                    }
                }
            }
        }
    }

    fn draw_node(render_pass: &mut wgpu::RenderPass<'_>, node: &Node, with_material: bool) {
        let Some(gpu) = node.gpu.as_ref() else {
            return;
        };
        render_pass.set_bind_group(1, &gpu.transform_bind_group, &[]);
        if with_material {
            render_pass.set_bind_group(2, &gpu.material_bind_group, &[]);
        }
        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
    }
}
