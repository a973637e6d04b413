//! GPU detection and compute placement
//!
//! Decides how many model layers llama.cpp offloads to the accelerator.

use std::process::Command;

/// Offload every layer; llama.cpp clamps this to the model's layer count.
pub const ALL_LAYERS: u32 = 999;

/// GPU information
#[derive(Debug, Clone, Default)]
pub struct GpuInfo {
    pub name: String,
    pub vram_total_mb: u64,
    pub is_available: bool,
}

/// Where the model weights end up after loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputePlacement {
    Cpu,
    Gpu { name: String, layers: u32 },
}

impl ComputePlacement {
    pub fn gpu_layers(&self) -> u32 {
        match self {
            ComputePlacement::Cpu => 0,
            ComputePlacement::Gpu { layers, .. } => *layers,
        }
    }
}

impl std::fmt::Display for ComputePlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputePlacement::Cpu => write!(f, "cpu"),
            ComputePlacement::Gpu { name, layers } => write!(f, "{} ({} layers)", name, layers),
        }
    }
}

/// True when llama.cpp was built with an accelerator backend.
pub const fn has_gpu_backend() -> bool {
    cfg!(any(feature = "cuda", feature = "vulkan", feature = "metal"))
}

/// Pick the compute placement for the model.
///
/// An explicit layer count from settings wins. Otherwise all layers go to
/// the GPU when the build has a GPU backend and a device is detected.
pub fn resolve_placement(gpu_layers_override: Option<u32>) -> ComputePlacement {
    placement_for(gpu_layers_override, has_gpu_backend(), detect_gpu)
}

fn placement_for(
    gpu_layers_override: Option<u32>,
    gpu_backend: bool,
    detect: impl FnOnce() -> GpuInfo,
) -> ComputePlacement {
    if !gpu_backend {
        if gpu_layers_override.is_some_and(|layers| layers > 0) {
            tracing::warn!("GPU layers requested but no GPU backend compiled in, using CPU");
        }
        return ComputePlacement::Cpu;
    }

    match gpu_layers_override {
        Some(0) => ComputePlacement::Cpu,
        Some(layers) => ComputePlacement::Gpu {
            name: "configured GPU".to_string(),
            layers,
        },
        None => {
            let gpu = detect();
            if gpu.is_available {
                ComputePlacement::Gpu {
                    name: gpu.name,
                    layers: ALL_LAYERS,
                }
            } else {
                ComputePlacement::Cpu
            }
        }
    }
}

/// Detect available GPU (best effort)
pub fn detect_gpu() -> GpuInfo {
    #[cfg(target_os = "macos")]
    {
        if let Some(info) = detect_gpu_system_profiler() {
            return info;
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(info) = detect_gpu_nvidia_smi() {
            return info;
        }
    }

    GpuInfo {
        name: "GPU not detected".to_string(),
        vram_total_mb: 0,
        is_available: false,
    }
}

#[cfg(not(target_os = "macos"))]
fn detect_gpu_nvidia_smi() -> Option<GpuInfo> {
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=name,memory.total", "--format=csv,noheader,nounits"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout))
}

#[cfg_attr(target_os = "macos", allow(dead_code))]
fn parse_nvidia_smi(stdout: &str) -> Option<GpuInfo> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?;
    let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
    if parts.len() < 2 {
        return None;
    }

    Some(GpuInfo {
        name: parts[0].to_string(),
        vram_total_mb: parts[1].parse::<u64>().ok()?,
        is_available: true,
    })
}

/// Detect GPU using system_profiler SPDisplaysDataType
#[cfg(target_os = "macos")]
fn detect_gpu_system_profiler() -> Option<GpuInfo> {
    let output = Command::new("system_profiler")
        .args(["SPDisplaysDataType"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let name = stdout.lines().map(str::trim).find_map(|line| {
        line.strip_prefix("Chipset Model:")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    })?;

    Some(GpuInfo {
        name: format!("{} (Metal)", name),
        vram_total_mb: 0,
        is_available: true,
    })
}
