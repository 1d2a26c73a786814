//! Compute device acquisition and health tracking.

use std::sync::{Arc, Mutex, PoisonError};

use wgpu::{Device, Instance, Queue};

use crate::config::DeviceConfig;

/// Errors that can occur during GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("GPU buffer mapping failed: {0}")]
    BufferMapFailed(String),
    #[error("GPU device lost: {0}")]
    DeviceLost(String),
    #[error("Texture {width}x{height} exceeds the device limit of {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },
    #[error("Row alignment {0} is not a non-zero multiple of 256 bytes")]
    RowAlignment(u32),
}

/// Device-lost flag shared with the wgpu callback.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct DeviceHealth {
    lost: Arc<Mutex<Option<String>>>,
}

impl DeviceHealth {
    pub fn mark_lost(&self, reason: impl Into<String>) {
        let mut lost = self.lost.lock().unwrap_or_else(PoisonError::into_inner);
        lost.get_or_insert_with(|| reason.into());
    }

    pub fn lost_reason(&self) -> Option<String> {
        self.lost
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_lost(&self) -> bool {
        self.lost_reason().is_some()
    }

    /// `Err(DeviceLost)` once the device has been lost.
    pub fn check(&self) -> Result<(), GpuError> {
        match self.lost_reason() {
            Some(reason) => Err(GpuError::DeviceLost(reason)),
            None => Ok(()),
        }
    }
}

/// A device plus whatever the effect built on it.
///
/// `pipelines` is the initializer's output, kept as a named field next to the
/// device rather than merged into it.
pub struct ComputeResources<P> {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub adapter_info: wgpu::AdapterInfo,
    pub pipelines: P,
    pub health: DeviceHealth,
}

impl<P> ComputeResources<P> {
    /// Maximum 2D texture edge on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Acquire a compute device and build effect pipelines on it.
///
/// Fails with [`GpuError::NoAdapter`] when no adapter is available; there is
/// no retry. Validation errors raised later by the device are logged and do
/// not interrupt work. Loss of the device is recorded in
/// [`ComputeResources::health`].
///
/// `initializer` runs exactly once, after the device is configured.
pub async fn acquire_device<P, F>(
    config: &DeviceConfig,
    initializer: F,
) -> Result<ComputeResources<P>, GpuError>
where
    F: FnOnce(&Device, &Queue) -> P,
{
    let instance = Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::METAL
            | wgpu::Backends::VULKAN
            | wgpu::Backends::DX12
            | wgpu::Backends::GL,
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference.into(),
            force_fallback_adapter: config.force_fallback_adapter,
            compatible_surface: None,
        })
        .await
        .map_err(|_| GpuError::NoAdapter)?;

    let mut limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
    if config.use_adapter_texture_limit {
        limits.max_texture_dimension_2d = adapter.limits().max_texture_dimension_2d;
    }

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some(&config.label),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
            experimental_features: wgpu::ExperimentalFeatures::default(),
        })
        .await?;

    let label = config.label.clone();
    device.on_uncaptured_error(Arc::new(move |error: wgpu::Error| {
        log::error!("[{}] uncaptured GPU error: {}", label, error);
    }));

    let health = DeviceHealth::default();
    let lost = health.clone();
    device.set_device_lost_callback(move |reason, message| {
        match reason {
            wgpu::DeviceLostReason::Destroyed => {
                log::debug!("GPU device destroyed: {}", message);
            }
            _ => log::error!("GPU device lost ({:?}): {}", reason, message),
        }
        lost.mark_lost(format!("{:?}: {}", reason, message));
    });

    let adapter_info = adapter.get_info();
    log::info!(
        "Acquired GPU device '{}' on {} ({:?}), max texture {}",
        config.label,
        adapter_info.name,
        adapter_info.backend,
        device.limits().max_texture_dimension_2d
    );

    let pipelines = initializer(&device, &queue);

    Ok(ComputeResources {
        device: Arc::new(device),
        queue: Arc::new(queue),
        adapter_info,
        pipelines,
        health,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_flag_is_shared() {
        let health = DeviceHealth::default();
        let callback_side = health.clone();
        assert!(health.check().is_ok());

        callback_side.mark_lost("Unknown: driver reset");
        callback_side.mark_lost("second report is ignored");
        assert!(health.is_lost());
        assert!(matches!(
            health.check(),
            Err(GpuError::DeviceLost(reason)) if reason == "Unknown: driver reset"
        ));
    }

    #[tokio::test]
    async fn test_acquire_runs_initializer_once() {
        let mut calls = 0;
        let resources = acquire_device(&DeviceConfig::default(), |device, _queue| {
            calls += 1;
            device.limits().max_texture_dimension_2d
        })
        .await;

        // May fail on CI without GPU
        if let Ok(resources) = resources {
            assert_eq!(calls, 1);
            assert_eq!(resources.pipelines, resources.max_texture_dimension());
            assert!(!resources.health.is_lost());
        }
    }
}
