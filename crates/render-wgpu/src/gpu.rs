use crate::camera::OrbitCamera;
use crate::mesh::{LineVertex, Vertex, axes_lines, box_mesh, grid_lines};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubescene_common::Color;
use cubescene_kernel::{Light, MeshNode, Scene};
use glam::Vec3;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniform block shared by both pipelines.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    sun_direction: [f32; 4],
    sun_color: [f32; 4],
}

impl Globals {
    fn new(camera: &OrbitCamera, scene: &Scene) -> Self {
        let sun = scene.sun();
        let sun_direction = sun.and_then(Light::direction_to_light).unwrap_or(Vec3::Y);
        let sun_color = match sun {
            Some(Light::Directional {
                color, intensity, ..
            }) => color.scaled(*intensity),
            _ => Color::BLACK,
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            ambient: scene.ambient().to_array(),
            sun_direction: sun_direction.extend(0.0).to_array(),
            sun_color: sun_color.to_array(),
        }
    }
}

/// Model matrix columns plus albedo, fed to the mesh pipeline per instance.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct MeshInstance {
    model: [[f32; 4]; 4],
    albedo: [f32; 4],
}

impl MeshInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn from_node(node: &MeshNode) -> Self {
        Self {
            model: node.transform.matrix().to_cols_array_2d(),
            albedo: node.material.color.to_array(),
        }
    }
}

/// A static vertex buffer and how many vertices it holds.
struct LineBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl LineBuffer {
    fn new(device: &wgpu::Device, label: &str, verts: &[LineVertex]) -> Self {
        Self {
            buffer: upload(
                device,
                label,
                bytemuck::cast_slice(verts),
                wgpu::BufferUsages::VERTEX,
            ),
            count: verts.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.count, 0..1);
    }
}

/// Draws the scene: background clear, grid and axes helpers, then the box.
///
/// Geometry is uploaded once from the scene passed to [`WgpuRenderer::new`];
/// per frame only the globals and the mesh instance are rewritten.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    box_vertices: wgpu::Buffer,
    box_indices: wgpu::Buffer,
    box_index_count: u32,
    instance_buffer: wgpu::Buffer,
    grid: LineBuffer,
    axes: LineBuffer,
    depth_view: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let targets = PipelineTargets {
            device,
            layout: &layout,
            shader: &shader,
            surface_format,
        };
        let mesh_pipeline = targets.build(
            "mesh_pipeline",
            ("vs_mesh", "fs_mesh"),
            &[Vertex::layout(), MeshInstance::layout()],
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
        );
        let line_pipeline = targets.build(
            "line_pipeline",
            ("vs_line", "fs_line"),
            &[LineVertex::layout()],
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
        );

        let (verts, indices) = box_mesh(scene.geometry());
        let box_vertices = upload(
            device,
            "box_vertices",
            bytemuck::cast_slice(&verts),
            wgpu::BufferUsages::VERTEX,
        );
        let box_indices = upload(
            device,
            "box_indices",
            bytemuck::cast_slice(&indices),
            wgpu::BufferUsages::INDEX,
        );

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_instance"),
            size: std::mem::size_of::<MeshInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let grid = LineBuffer::new(device, "grid_lines", &grid_lines(scene.grid()));
        let axes = LineBuffer::new(device, "axes_lines", &axes_lines(scene.axes().size));

        tracing::debug!(
            ?surface_format,
            grid_vertices = grid.count,
            box_indices = indices.len(),
            "scene renderer ready"
        );

        Self {
            mesh_pipeline,
            line_pipeline,
            globals_buffer,
            globals_bind_group,
            box_vertices,
            box_indices,
            box_index_count: indices.len() as u32,
            instance_buffer,
            grid,
            axes,
            depth_view: depth_view(device, width, height),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = depth_view(device, width, height);
    }

    /// Draw one frame into `target`. The scene is only read.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::new(camera, scene)),
        );
        let mesh = scene.mesh();
        if let Some(node) = mesh {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::bytes_of(&MeshInstance::from_node(node)),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_bind_group(0, &self.globals_bind_group, &[]);

            pass.set_pipeline(&self.line_pipeline);
            if scene.grid().visible {
                self.grid.draw(&mut pass);
            }
            if scene.axes().visible {
                self.axes.draw(&mut pass);
            }

            if mesh.is_some() {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_vertex_buffer(0, self.box_vertices.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.box_indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.box_index_count, 0, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Everything the two scene pipelines have in common.
struct PipelineTargets<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
}

impl PipelineTargets<'_> {
    fn build(
        &self,
        label: &str,
        (vs, fs): (&str, &str),
        buffers: &[wgpu::VertexBufferLayout<'_>],
        primitive: wgpu::PrimitiveState,
    ) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some(vs),
                    compilation_options: Default::default(),
                    buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
    }
}

fn upload(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

fn depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

/// Scene colors are linear and the surface is sRGB, so no conversion here.
fn clear_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_and_instance_sizes() {
        // mat4 + three vec4s; WGSL needs 16-byte multiples.
        assert_eq!(std::mem::size_of::<Globals>(), 112);
        assert_eq!(std::mem::size_of::<MeshInstance>(), 80);
        assert_eq!(MeshInstance::layout().array_stride, 80);
        assert_eq!(Vertex::layout().array_stride, 24);
        assert_eq!(LineVertex::layout().array_stride, 28);
    }

    #[test]
    fn globals_carry_scene_lighting() {
        let scene = Scene::default();
        let camera = OrbitCamera::from_config(scene.camera(), 1.0);
        let g = Globals::new(&camera, &scene);
        assert_eq!(g.ambient, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(g.sun_color, [1.0, 1.0, 1.0, 1.0]);
        let dir = Vec3::from_slice(&g.sun_direction[..3]);
        assert!(dir.abs_diff_eq(Vec3::new(10.0, 10.0, 5.0).normalize(), 1e-6));
        assert_eq!(g.sun_direction[3], 0.0);
    }

    #[test]
    fn instance_follows_mounted_node() {
        let mut scene = Scene::default();
        scene.mount();
        scene.frame(0.0);
        let node = scene.mesh().unwrap();
        let inst = MeshInstance::from_node(node);
        // Translation lives in the last column.
        assert!((inst.model[3][2] - 2.0).abs() < 1e-5);
        assert_eq!(inst.albedo, node.material.color.to_array());
    }

    #[test]
    fn background_clears_unconverted() {
        let c = clear_color(Color::linear(0.25, 0.5, 1.0));
        assert_eq!((c.r, c.g, c.b, c.a), (0.25, 0.5, 1.0, 1.0));
    }
}
