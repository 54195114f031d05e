use wgpu::util::DeviceExt;
use wgpu::*;

use super::backend::{ClearColor, RenderBackend, Uniform};
use super::gpu_init::GpuContext;
use crate::error::{CubeError, Result};
use crate::model::Vertex;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// CPU mirror of `CubeUniform` in cube.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub theta: f32,
    pub dx: f32,
    pub dy: f32,
    pub _pad: f32,
}

impl Default for CubeUniform {
    fn default() -> Self {
        Self {
            view: glam::Mat4::IDENTITY.to_cols_array_2d(),
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            theta: 0.0,
            dx: 0.0,
            dy: 0.0,
            _pad: 0.0,
        }
    }
}

impl CubeUniform {
    pub fn apply(&mut self, uniform: Uniform) {
        match uniform {
            Uniform::Theta(v) => self.theta = v,
            Uniform::Dx(v) => self.dx = v,
            Uniform::Dy(v) => self.dy = v,
            Uniform::View(m) => self.view = m.to_cols_array_2d(),
            Uniform::Projection(m) => self.projection = m.to_cols_array_2d(),
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

pub struct UniformResources {
    pub uniform_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub bind_group: BindGroup,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_uniform_resources(device: &Device) -> UniformResources {
    let uniform_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("cube_uniform_buffer"),
        contents: bytemuck::bytes_of(&CubeUniform::default()),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("cube_bind_group_layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("cube_bind_group"),
        layout: &bind_group_layout,
        entries: &[BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
    });

    UniformResources { uniform_buffer, bind_group_layout, bind_group }
}

/// Compile cube.wgsl and link it into a depth-tested, back-face-culled pipeline.
/// Validation failures come back as `RenderBackend` instead of panicking.
pub async fn create_cube_pipeline(
    device: &Device,
    format: TextureFormat,
    bind_group_layout: &BindGroupLayout,
) -> Result<RenderPipeline> {
    device.push_error_scope(ErrorFilter::Validation);

    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("cube_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("cube_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("cube_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    });

    if let Some(err) = device.pop_error_scope().await {
        return Err(CubeError::backend(format!("cube shader program rejected: {err}")));
    }
    Ok(pipeline)
}

/// How `draw_indexed` reacts when the surface refuses a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAcquire {
    Skip,
    Reconfigure,
    Fatal,
}

/// Timeouts are transient and an outdated swapchain only needs reconfiguring.
/// Lost surfaces and out-of-memory end the session.
pub fn surface_error_action(err: &SurfaceError) -> FrameAcquire {
    match err {
        SurfaceError::Timeout => FrameAcquire::Skip,
        SurfaceError::Outdated => FrameAcquire::Reconfigure,
        _ => FrameAcquire::Fatal,
    }
}

/// wgpu implementation of [`RenderBackend`].
pub struct WgpuBackend {
    gpu: GpuContext,
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    uniforms: CubeUniform,
    depth_view: TextureView,
    mesh: Option<MeshBuffer>,
    pending_clear: Option<Color>,
}

impl WgpuBackend {
    pub async fn new(gpu: GpuContext) -> Result<Self> {
        let resources = create_uniform_resources(&gpu.device);
        let pipeline = create_cube_pipeline(&gpu.device, gpu.format, &resources.bind_group_layout).await?;
        // The view keeps its texture alive
        let (_, depth_view) = create_depth_texture(&gpu.device, gpu.config.width, gpu.config.height);
        tracing::info!(format = ?gpu.format, width = gpu.config.width, height = gpu.config.height, "cube pipeline ready");

        Ok(Self {
            gpu,
            pipeline,
            uniform_buffer: resources.uniform_buffer,
            bind_group: resources.bind_group,
            uniforms: CubeUniform::default(),
            depth_view,
            mesh: None,
            pending_clear: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.gpu.resize(width, height);
        let (_, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self.depth_view = depth_view;
        tracing::debug!(width, height, "surface resized");
    }
}

impl RenderBackend for WgpuBackend {
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()> {
        let vertex_buffer = self.gpu.device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = self.gpu.device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: BufferUsages::INDEX,
        });
        self.mesh = Some(MeshBuffer { vertex_buffer, index_buffer, index_count: indices.len() as u32 });
        Ok(())
    }

    fn set_uniform(&mut self, uniform: Uniform) -> Result<()> {
        self.uniforms.apply(uniform);
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        Ok(())
    }

    fn clear(&mut self, color: ClearColor) -> Result<()> {
        self.pending_clear = Some(color.into());
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        let clear = self.pending_clear.take();
        let mesh = self
            .mesh
            .as_ref()
            .ok_or_else(|| CubeError::backend("draw issued before geometry upload"))?;
        if index_count > mesh.index_count {
            return Err(CubeError::backend(format!(
                "draw of {index_count} indices exceeds the {} uploaded",
                mesh.index_count
            )));
        }

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => match surface_error_action(&e) {
                FrameAcquire::Skip => {
                    tracing::warn!(error = %e, "frame skipped");
                    return Ok(());
                }
                FrameAcquire::Reconfigure => {
                    self.gpu.reconfigure();
                    tracing::warn!(error = %e, "surface reconfigured, frame skipped");
                    return Ok(());
                }
                FrameAcquire::Fatal => {
                    return Err(CubeError::backend(format!("surface unavailable: {e}")));
                }
            },
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("cube_encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: clear.map_or(LoadOp::Load, LoadOp::Clear),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: if clear.is_some() { LoadOp::Clear(1.0) } else { LoadOp::Load },
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.bind_group, &[]);
            rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint16);
            rp.draw_indexed(0..index_count, 0, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn uniform_layout_matches_shader_block() {
        // two mat4x4<f32> + four f32
        assert_eq!(std::mem::size_of::<CubeUniform>(), 144);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn apply_touches_only_the_named_field() {
        let mut u = CubeUniform::default();
        u.apply(Uniform::Dy(0.1));
        assert_eq!(u.dy, 0.1);
        assert_eq!((u.theta, u.dx), (0.0, 0.0));

        let view = Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -5.0));
        u.apply(Uniform::View(view));
        assert_eq!(u.view, view.to_cols_array_2d());
        assert_eq!(u.projection, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn surface_errors_split_into_skip_reconfigure_and_fatal() {
        assert_eq!(surface_error_action(&SurfaceError::Timeout), FrameAcquire::Skip);
        assert_eq!(surface_error_action(&SurfaceError::Outdated), FrameAcquire::Reconfigure);
        assert_eq!(surface_error_action(&SurfaceError::Lost), FrameAcquire::Fatal);
        assert_eq!(surface_error_action(&SurfaceError::OutOfMemory), FrameAcquire::Fatal);
    }

    fn cube_shader() -> naga::Module {
        let module = naga::front::wgsl::parse_str(include_str!("shaders/cube.wgsl")).expect("cube.wgsl parses");
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty())
            .validate(&module)
            .expect("cube.wgsl validates");
        module
    }

    #[test]
    fn shader_uniform_block_matches_cpu_layout() {
        let module = cube_shader();
        let (span, members) = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { members, span }) if name == "CubeUniform" => {
                    Some((*span, members.clone()))
                }
                _ => None,
            })
            .expect("CubeUniform declared in cube.wgsl");

        assert_eq!(span as usize, std::mem::size_of::<CubeUniform>());

        let offsets: Vec<(String, u32)> = members
            .iter()
            .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
            .collect();
        let expected = [
            ("view", std::mem::offset_of!(CubeUniform, view)),
            ("projection", std::mem::offset_of!(CubeUniform, projection)),
            ("theta", std::mem::offset_of!(CubeUniform, theta)),
            ("dx", std::mem::offset_of!(CubeUniform, dx)),
            ("dy", std::mem::offset_of!(CubeUniform, dy)),
            ("_pad", std::mem::offset_of!(CubeUniform, _pad)),
        ];
        assert_eq!(offsets.len(), expected.len());
        for ((name, offset), (want_name, want_offset)) in offsets.iter().zip(expected) {
            assert_eq!(name, want_name);
            assert_eq!(*offset as usize, want_offset, "offset of {name}");
        }
    }

    #[test]
    fn shader_exposes_the_pipeline_entry_points() {
        let module = cube_shader();
        let stages: Vec<(&str, naga::ShaderStage)> =
            module.entry_points.iter().map(|ep| (ep.name.as_str(), ep.stage)).collect();
        assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn shader_translates_after_rotating() {
        // Offsets are added to the rotated position, never rotated themselves
        let src: String = include_str!("shaders/cube.wgsl").split_whitespace().collect();
        let rotate = src.find("letrotated=").expect("rotation step");
        let translate = src
            .find("rotated.x+u.dx,rotated.y+u.dy,rotated.z")
            .expect("translation of the rotated position");
        assert!(rotate < translate);
        assert!(src.contains("u.projection*u.view*world"));
    }

    #[test]
    fn clear_color_converts_to_wgpu() {
        let c: Color = ClearColor::default().into();
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.75, 0.79, 1.0));
    }
}
