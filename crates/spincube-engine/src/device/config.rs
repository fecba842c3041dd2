/// Options used when acquiring the GPU context.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Pick an sRGB swapchain format when the surface offers one.
    ///
    /// Off by default: the cube's vertex colors are display values, the same
    /// way a WebGL canvas treats them.
    pub prefer_srgb: bool,

    /// Swap behavior. FIFO is the only mode every backend guarantees.
    pub present_mode: wgpu::PresentMode,

    /// Baseline limits requested from the adapter.
    ///
    /// Resolution limits (texture dimensions) are raised to what the adapter
    /// supports, so a large or HiDPI window can still be configured.
    pub required_limits: wgpu::Limits,
}

impl GpuConfig {
    /// Limits to request from an adapter reporting `adapter_limits`.
    pub fn limits_for(&self, adapter_limits: wgpu::Limits) -> wgpu::Limits {
        self.required_limits.clone().using_resolution(adapter_limits)
    }
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}
