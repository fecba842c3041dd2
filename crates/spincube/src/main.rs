mod app;

use anyhow::Result;

use spincube_engine::device::GpuConfig;
use spincube_engine::logging::{init_logging, LoggingConfig};
use spincube_engine::window::{Runtime, RuntimeConfig};

use app::{CubeApp, CubeAppConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig::default(),
        GpuConfig::default(),
        CubeApp::new(CubeAppConfig::default()),
    )
}
