use clap::Parser;
use kiva_probe::config::{Command, FetchArgs};
use kiva_probe::domain::endpoint::ALL_ENDPOINTS;
use kiva_probe::domain::script::{builtin_scripts, find_script, Script};
use kiva_probe::utils::error::{ErrorSeverity, ProbeError};
use kiva_probe::utils::{logger, validation::Validate};
use kiva_probe::{CliConfig, ClientSettings, ProbeRunner, StdoutSink, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting kiva-probe");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ kiva-probe failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

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

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), ProbeError> {
    let file = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            Some(file)
        }
        None => None,
    };

    let settings = config.resolve_settings(file.as_ref());
    settings.validate()?;

    let scripts = file.map(|f| f.scripts).unwrap_or_default();

    match &config.command {
        Command::Endpoints => {
            list_endpoints(&scripts);
            Ok(())
        }
        Command::Fetch(args) => fetch(&settings, args, !config.compact).await,
        Command::Run { script } => {
            let script = find_script(script, &scripts)?;
            run_script(&settings, &script, !config.compact).await
        }
    }
}

async fn fetch(settings: &ClientSettings, args: &FetchArgs, pretty: bool) -> Result<(), ProbeError> {
    let script = Script {
        name: format!("fetch {}", args.endpoint),
        description: String::new(),
        steps: vec![args.to_step()],
    };
    script.validate()?;
    run_script(settings, &script, pretty).await
}

async fn run_script(settings: &ClientSettings, script: &Script, pretty: bool) -> Result<(), ProbeError> {
    let runner = ProbeRunner::new(settings, StdoutSink::new(pretty))?;
    let summary = runner.run_script(script).await?;
    tracing::info!(
        "📊 {} step(s), {} request(s), {} body(ies) printed",
        summary.steps_executed,
        summary.requests_issued,
        summary.bodies_emitted
    );
    Ok(())
}

fn list_endpoints(configured: &[Script]) {
    println!("📋 Endpoints:");
    for endpoint in ALL_ENDPOINTS {
        let spec = endpoint.spec();
        let defaults = spec
            .default_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, kiva_probe::domain::model::QueryValue::from(*v)))
            .collect::<Vec<_>>()
            .join("&");
        println!(
            "  {:<15} {:<26} {:<20} {}{}",
            spec.name,
            format!("{}.json", spec.path),
            defaults,
            spec.description,
            if spec.paged { " (paged)" } else { "" }
        );
    }

    println!();
    println!("📜 Scripts:");
    for script in builtin_scripts().iter().chain(configured.iter()) {
        println!("  {:<15} {}", script.name, script.description);
    }
}
