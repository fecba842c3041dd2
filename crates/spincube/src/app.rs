use anyhow::Result;

use spincube_engine::core::{App, AppControl, FrameCtx};
use spincube_engine::cube::{CubeRenderer, GpuCubeRenderer, RotationState};
use spincube_engine::device::Gpu;
use spincube_engine::render::{GpuContext, RenderCtx};

/// Settings for the demo.
#[derive(Debug, Clone)]
pub struct CubeAppConfig {
    /// Background behind the cube. White, like the page behind a transparent canvas.
    pub clear_color: wgpu::Color,

    /// Log frame statistics every this many frames; `0` disables them.
    pub stats_interval: u64,
}

impl Default for CubeAppConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::WHITE,
            stats_interval: 600,
        }
    }
}

pub struct CubeApp {
    config: CubeAppConfig,
    renderer: Option<GpuCubeRenderer>,
    rotation: RotationState,
    frame_seconds: f32,
}

impl CubeApp {
    pub fn new(config: CubeAppConfig) -> Self {
        Self {
            config,
            renderer: None,
            rotation: RotationState::new(),
            frame_seconds: 0.0,
        }
    }

    fn record_stats(&mut self, frame_index: u64, dt: f32) {
        if self.config.stats_interval == 0 {
            return;
        }
        self.frame_seconds += dt;
        if (frame_index + 1) % self.config.stats_interval == 0 {
            let fps = self.config.stats_interval as f32 / self.frame_seconds.max(f32::EPSILON);
            log::debug!(
                "frame {}: {fps:.1} fps, {} rotation steps",
                frame_index + 1,
                self.rotation.frames()
            );
            self.frame_seconds = 0.0;
        }
    }
}

impl App for CubeApp {
    fn on_init(&mut self, gpu: Option<&Gpu<'_>>) -> Result<()> {
        let rctx = gpu.map(RenderCtx::from_gpu);
        let mut context = rctx.as_ref().map(GpuContext::new);

        let renderer = CubeRenderer::initialize(context.as_mut())?;
        log::debug!("initial rotation {:?}", self.rotation.matrix());

        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderer) = self.renderer.as_mut() else {
            log::error!("frame requested before the cube was initialized");
            return AppControl::Exit;
        };
        let rotation = &mut self.rotation;

        let control = ctx.render(self.config.clear_color, |rctx, target| {
            let mut gpu = GpuContext::with_target(rctx, target);
            renderer.frame(&mut gpu, rotation);
        });

        self.record_stats(ctx.time.frame_index, ctx.time.dt);
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spincube_engine::cube::CubeError;

    #[test]
    fn stats_window_resets_after_interval() {
        let mut app = CubeApp::new(CubeAppConfig {
            stats_interval: 3,
            ..Default::default()
        });
        app.record_stats(0, 0.016);
        app.record_stats(1, 0.016);
        assert!(app.frame_seconds > 0.03);
        app.record_stats(2, 0.016);
        assert_eq!(app.frame_seconds, 0.0);
    }

    #[test]
    fn zero_interval_disables_stats() {
        let mut app = CubeApp::new(CubeAppConfig {
            stats_interval: 0,
            ..Default::default()
        });
        app.record_stats(0, 0.5);
        assert_eq!(app.frame_seconds, 0.0);
    }

    #[test]
    fn new_app_starts_uninitialized() {
        let app = CubeApp::new(CubeAppConfig::default());
        assert!(app.renderer.is_none());
        assert_eq!(app.rotation.frames(), 0);
    }

    #[test]
    fn init_without_gpu_reports_context_unavailable() {
        let mut app = CubeApp::new(CubeAppConfig::default());
        let err = app.on_init(None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CubeError>(),
            Some(CubeError::ContextUnavailable)
        ));
        assert!(app.renderer.is_none());
    }
}
