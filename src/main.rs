use clap::Parser;
use places_grid::core::ConfigProvider;
use places_grid::utils::prompt::{confirm_api_calls, print_tile_plan};
use places_grid::utils::{logger, validation::Validate};
use places_grid::{plan_tiles, CliConfig, GooglePlacesClient, LocalStorage, PlacesPipeline, ScanEngine};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);
    tracing::info!("Starting places-grid CLI");

    // 驗證配置
    if let Err(e) = config.validate() {
        e.report();
        std::process::exit(e.exit_code());
    }

    let tiles = match plan_tiles(&config) {
        Ok(tiles) => tiles,
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    };

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no API calls will be made");
        print_tile_plan(&tiles, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    let client = GooglePlacesClient::new(
        config.api_endpoint.clone(),
        config.api_key.clone().unwrap_or_default(),
    )
    .map(|c| {
        c.with_language_code(config.language_code.clone())
            .with_timeout(Duration::from_secs(config.timeout_seconds))
    });
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    };

    if !config.yes {
        let confirmed = confirm_api_calls(
            tiles.len(),
            &mut std::io::stdin().lock(),
            &mut std::io::stdout(),
        )?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path());
    let pipeline = PlacesPipeline::new(storage, config, client);
    let engine = ScanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Scan completed successfully!");
            println!("✅ Scan completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
