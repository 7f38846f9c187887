use clap::Parser;
use kiva_probe::config::ClientSettings;
use kiva_probe::core::RunSummary;
use kiva_probe::utils::error::ErrorSeverity;
use kiva_probe::utils::{logger, validation::Validate};
use kiva_probe::{ApiClient, ProbeRunner, StdoutSink, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-probe")]
#[command(about = "Run the probe scripts defined in a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "kiva-probe.toml")]
    config: String,

    /// Only run these scripts (repeatable)
    #[arg(short, long)]
    script: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show the requests each script starts with, without sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based probe");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let mut settings = ClientSettings::default();
    settings.apply(&config.client);

    // 驗證配置
    if let Err(e) = config.validate().and_then(|_| settings.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let selected: Vec<_> = config
        .scripts
        .iter()
        .filter(|s| args.script.is_empty() || args.script.contains(&s.name))
        .collect();

    if selected.is_empty() {
        eprintln!("❌ No scripts to run in '{}'", args.config);
        std::process::exit(1);
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&settings, &selected)?;
        return Ok(());
    }

    let runner = ProbeRunner::new(&settings, StdoutSink::new(true))?;
    let mut total = RunSummary::default();

    for script in selected {
        match runner.run_script(script).await {
            Ok(summary) => total.absorb(summary),
            Err(e) => {
                tracing::error!(
                    "❌ Script '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    script.name,
                    e,
                    e.category(),
                    e.severity()
                );
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

                let exit_code = match e.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                if exit_code > 0 {
                    std::process::exit(exit_code);
                }
            }
        }
    }

    tracing::info!(
        "📊 Total: {} step(s), {} request(s), {} body(ies) printed",
        total.steps_executed,
        total.requests_issued,
        total.bodies_emitted
    );

    Ok(())
}

fn perform_dry_run(
    settings: &ClientSettings,
    scripts: &[&kiva_probe::Script],
) -> anyhow::Result<()> {
    let client = ApiClient::new(settings)?;

    println!("🔍 Dry Run Analysis:");
    println!("  Base URL: {}", settings.base_url);
    println!("  Timeout: {}s, retries: {}", settings.timeout_seconds, settings.retry_attempts);
    println!("  Max follow-up pages: {}", settings.max_pages);

    for script in scripts {
        println!();
        println!("📜 {} - {}", script.name, script.description);
        for (index, step) in script.steps.iter().enumerate() {
            let url = client.build_url(&step.descriptor()?);
            println!("  {}. GET {} ({})", index + 1, url, step.output.as_str());
            if let Some(paginate) = &step.paginate {
                let limit = match paginate.limit {
                    Some(n) if n > 0 => format!(", first {} page(s) only", n),
                    _ => String::new(),
                };
                println!(
                    "     then follow pages by paging.{} and {} them{}",
                    paginate.mode.as_str(),
                    paginate.output.as_str(),
                    limit
                );
            }
        }
    }

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
