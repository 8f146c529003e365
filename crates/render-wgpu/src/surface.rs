use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use playstage_assets::{Texture, TextureCache};
use playstage_common::{Color, Rect, TextureHandle};
use playstage_render::DrawSurface;
use std::collections::BTreeMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const MAX_QUADS: u32 = 4096;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.08,
    a: 1.0,
};

/// Errors from surface bring-up. Initialization failure is the engine's
/// sole fatal category; everything after `new` is absorbed and logged.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    AdapterUnavailable,
    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    screen_size: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadInstance {
    center: [f32; 2],
    half_size: [f32; 2],
    rot_pad: [f32; 2],
    color: [f32; 4],
}

/// One recorded quad with the raster state it was pushed under.
struct QuadCommand {
    instance: QuadInstance,
    texture: Option<TextureHandle>,
    scissor: [u32; 4],
}

/// wgpu-backed implementation of the draw surface.
///
/// Draw calls are transformed by the active viewport/scale on the CPU and
/// recorded; `present` acquires a swapchain frame and flushes them in
/// submission order.
pub struct WgpuSurface {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::BindGroup,
    textures: BTreeMap<TextureHandle, wgpu::BindGroup>,
    instance_buffer: wgpu::Buffer,
    commands: Vec<QuadCommand>,
    viewport: Rect,
    scale: Vec2,
}

impl WgpuSurface {
    /// Bring up the GPU surface for `window`. This is startup-fatal on
    /// failure; the caller aborts before the engine loop begins.
    pub fn new(window: Arc<Window>) -> Result<Self, SurfaceError> {
        let size = window.inner_size();

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
        .ok_or(SurfaceError::AdapterUnavailable)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("playstage_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&Globals {
                screen_size: [config.width as f32, config.height as f32],
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::QUAD_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                        2 => Float32x2,
                        3 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_instance_buffer"),
            size: (MAX_QUADS as u64) * std::mem::size_of::<QuadInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let white = Self::create_texture_bind_group(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            1,
            1,
            &[255, 255, 255, 255],
            "white_texture",
        );

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU surface initialized"
        );

        let viewport = Rect::new(0.0, 0.0, config.width as f32, config.height as f32);
        Ok(Self {
            device,
            queue,
            surface,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            texture_layout,
            sampler,
            white,
            textures: BTreeMap::new(),
            instance_buffer,
            commands: Vec::new(),
            viewport,
            scale: Vec2::ONE,
        })
    }

    /// Reconfigure after a window resize. Resets the base viewport to the
    /// new full-window rectangle; resizes happen between frames, outside
    /// any viewport substitution.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                screen_size: [self.config.width as f32, self.config.height as f32],
                _pad: [0.0; 2],
            }),
        );
        self.viewport = Rect::new(0.0, 0.0, self.config.width as f32, self.config.height as f32);
        self.scale = Vec2::ONE;
    }

    /// Output size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Upload any cache textures the GPU has not seen yet.
    pub fn sync_textures(&mut self, cache: &TextureCache) {
        for texture in cache.iter() {
            if !self.textures.contains_key(&texture.handle) {
                self.upload_texture(texture);
            }
        }
    }

    /// Upload one decoded texture and register it under its handle.
    pub fn upload_texture(&mut self, texture: &Texture) {
        let bind_group = Self::create_texture_bind_group(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            texture.width,
            texture.height,
            &texture.rgba,
            "cache_texture",
        );
        self.textures.insert(texture.handle, bind_group);
        tracing::debug!(handle = texture.handle.0, "texture uploaded");
    }

    #[allow(clippy::too_many_arguments)]
    fn create_texture_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
        rgba: &[u8],
        label: &str,
    ) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&Default::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Apply the active viewport/scale to a caller-space rectangle and
    /// record a quad. Quads fully outside the clip are dropped here.
    fn push_quad(
        &mut self,
        rect: Rect,
        angle_degrees: f32,
        color: [f32; 4],
        texture: Option<TextureHandle>,
    ) {
        let Some(scissor) = self.scissor_for_viewport() else {
            return;
        };
        let out = Rect::new(
            self.viewport.x + rect.x * self.scale.x,
            self.viewport.y + rect.y * self.scale.y,
            rect.w * self.scale.x,
            rect.h * self.scale.y,
        );
        if out.is_empty() {
            return;
        }

        // A referenced texture that never reached the GPU degrades to the
        // placeholder fill, mirroring the bridge's load-failure behavior.
        let (texture, color) = match texture {
            Some(handle) if self.textures.contains_key(&handle) => (Some(handle), color),
            Some(handle) => {
                tracing::warn!(handle = handle.0, "texture not uploaded, drawing placeholder");
                (None, color_to_linear(Color::rgb(255, 0, 255)))
            }
            None => (None, color),
        };

        self.commands.push(QuadCommand {
            instance: QuadInstance {
                center: [out.x + out.w * 0.5, out.y + out.h * 0.5],
                half_size: [out.w * 0.5, out.h * 0.5],
                rot_pad: [angle_degrees.to_radians(), 0.0],
                color,
            },
            texture,
            scissor,
        });
    }

    /// The active viewport clamped to the output, or `None` when nothing
    /// inside it can be visible.
    fn scissor_for_viewport(&self) -> Option<[u32; 4]> {
        let (sw, sh) = (self.config.width as f32, self.config.height as f32);
        let x0 = self.viewport.x.clamp(0.0, sw);
        let y0 = self.viewport.y.clamp(0.0, sh);
        let x1 = self.viewport.right().clamp(0.0, sw);
        let y1 = self.viewport.bottom().clamp(0.0, sh);
        if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
            return None;
        }
        Some([
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ])
    }
}

impl DrawSurface for WgpuSurface {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(rect, 0.0, color_to_linear(color), None);
    }

    fn draw_texture(&mut self, texture: TextureHandle, dst: Rect, angle: f32) {
        self.push_quad(dst, angle, [1.0, 1.0, 1.0, 1.0], Some(texture));
    }

    fn present(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.commands.clear();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                self.commands.clear();
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.commands.len() > MAX_QUADS as usize {
            tracing::warn!(
                dropped = self.commands.len() - MAX_QUADS as usize,
                "quad budget exceeded"
            );
            self.commands.truncate(MAX_QUADS as usize);
        }

        let instances: Vec<QuadInstance> =
            self.commands.iter().map(|cmd| cmd.instance).collect();
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quad_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(0, self.instance_buffer.slice(..));

            for (i, cmd) in self.commands.iter().enumerate() {
                let [x, y, w, h] = cmd.scissor;
                pass.set_scissor_rect(x, y, w, h);
                let bind_group = cmd
                    .texture
                    .and_then(|handle| self.textures.get(&handle))
                    .unwrap_or(&self.white);
                pass.set_bind_group(1, bind_group, &[]);
                let i = i as u32;
                pass.draw(0..6, i..i + 1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.commands.clear();
    }
}

/// Convert an 8-bit sRGB color to the linear values the pipeline blends in.
fn color_to_linear(color: Color) -> [f32; 4] {
    let channel = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [
        channel(color.r),
        channel(color.g),
        channel(color.b),
        color.a as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_conversion_endpoints() {
        let black = color_to_linear(Color::rgb(0, 0, 0));
        let white = color_to_linear(Color::rgb(255, 255, 255));
        assert_eq!(black[0], 0.0);
        assert!((white[0] - 1.0).abs() < 1e-6);

        let translucent = color_to_linear(Color::rgba(255, 255, 0, 120));
        assert!((translucent[3] - 120.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn instance_layout_matches_attributes() {
        // Four vec2/vec4 attributes, tightly packed.
        assert_eq!(std::mem::size_of::<QuadInstance>(), 40);
    }
}
