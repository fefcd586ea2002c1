//! `codeforge serve` - start the upload/download server.

use crate::models::ForgeConfig;
use crate::server::start_server;
use crate::Result;
use std::env;

pub async fn run(port: Option<u16>) -> Result<()> {
    let project_root = env::current_dir()?;
    let mut config = ForgeConfig::load(&project_root)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    start_server(config).await
}
