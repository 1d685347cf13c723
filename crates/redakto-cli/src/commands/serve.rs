use anyhow::Result;
use redakto_server::ApiServer;

use super::Context;

pub async fn handle(context: &Context, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| context.config.server.host.clone());
    let port = port.unwrap_or(context.config.server.port);

    let registry = context.registry()?;
    println!("Starting {} on {}:{}", context.config.app.name, host, port);
    ApiServer::new(context.config.app.clone(), registry)
        .serve(&host, port)
        .await
}
