use anyhow::Result;
use clap::Parser;

use smoketest_core::SmokeTestConfig;
use smoketest_daemon::cli::DaemonCli;
use smoketest_daemon::logging::init_tracing;
use smoketest_daemon::server::SmokeTestServer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드 (파일 -> 환경변수 -> CLI 순으로 우선)
    let mut config = SmokeTestConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load {}: {}", cli.config.display(), e))?;
    cli.apply_overrides(&mut config);

    if cli.validate {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
        println!(
            "configuration OK: {} ({} profiles)",
            cli.config.display(),
            config.profiles.len()
        );
        return Ok(());
    }

    init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "smoketest-daemon starting"
    );

    let server = SmokeTestServer::build_from_config(config)?;
    server.run().await
}
