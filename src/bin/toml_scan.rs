use clap::Parser;
use places_grid::core::ConfigProvider;
use places_grid::utils::prompt::{confirm_api_calls, print_tile_plan};
use places_grid::utils::{logger, validation::Validate};
use places_grid::{plan_tiles, GooglePlacesClient, LocalStorage, PlacesPipeline, ScanEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-scan")]
#[command(about = "Places grid scan driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "scan-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override tile size from config
    #[arg(long)]
    tile_km: Option<f64>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the planned tiles without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_logger(args.verbose, args.json_logs);
    tracing::info!("🚀 Starting TOML-based places scan");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    config.verbose = args.verbose;

    // 應用命令列覆蓋設定
    if let Some(tile_km) = args.tile_km {
        config.grid.tile_km = tile_km;
        tracing::info!("🔧 Tile size overridden to: {} km", tile_km);
    }

    if let Err(e) = config.validate() {
        e.report();
        std::process::exit(e.exit_code());
    }
    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config);

    let tiles = match plan_tiles(&config) {
        Ok(tiles) => tiles,
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no API calls will be made");
        print_tile_plan(&tiles, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    let client = config.api_key().and_then(|key| {
        Ok(GooglePlacesClient::new(config.endpoint(), key)?
            .with_language_code(config.language_code())
            .with_timeout(config.timeout()))
    });
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    };

    if !args.yes {
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

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

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

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Scan: {}", config.scan.name);
    if let Some(description) = &config.scan.description {
        println!("  Description: {}", description);
    }
    let b = &config.bounds;
    println!(
        "  Bounds: N {} / S {} / E {} / W {}",
        b.north, b.south, b.east, b.west
    );
    println!(
        "  Grid: {} km tiles, overlap {}",
        config.tile_km(),
        config.overlap_ratio()
    );
    println!("  Place types: {}", config.place_types().join(", "));
    println!("  Request delay: {:?}", config.request_delay());
    println!("  Output: {}/{}", config.output_path(), config.output_stem());
    println!();
}
