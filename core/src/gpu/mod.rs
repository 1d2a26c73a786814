//! Compute device management and pass dispatch using wgpu.
//!
//! Effects acquire one device each through [`acquire_device`], compile their
//! kernels in the initializer, and run invocations through
//! [`run_compute_passes`].

pub mod context;
pub mod dispatch;
pub mod layouts;
pub mod pipelines;
pub mod textures;

pub use context::{acquire_device, ComputeResources, DeviceHealth, GpuError};
pub use dispatch::{check_row_alignment, run_compute_passes, ComputePass};
pub use layouts::{effect_layout_builder, BindGroupLayoutBuilder};
pub use pipelines::{ComputeKernel, WORKGROUP_SIZE};
pub use textures::{EffectTexture, ReadbackBuffer};
