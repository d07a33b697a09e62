use clap::Parser;
use iam_onboard::app::simulate::{simulate, SimulationOutcome};
use iam_onboard::config::Command;
use iam_onboard::core::template::render_template;
use iam_onboard::utils::error::ErrorSeverity;
use iam_onboard::utils::{logger, validation::Validate};
use iam_onboard::{CliConfig, NotifyError, StackManifest, UserCreatedEvent};

async fn run(command: Command) -> Result<(), NotifyError> {
    let manifest = StackManifest::from_file(command.stack_path())?;

    match command {
        Command::Validate { .. } => {
            manifest.validate()?;
            println!("✅ Stack '{}' is valid", manifest.stack.name);
        }
        Command::Render { output, .. } => {
            let template = render_template(&manifest)?;
            let rendered = serde_json::to_string_pretty(&template)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, rendered)?;
                    println!("📁 Template saved to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Command::Outputs { .. } => {
            manifest.validate()?;
            for output in manifest.outputs() {
                println!("{:<20} {}", output.key, output.value);
            }
        }
        Command::Simulate {
            event, password, ..
        } => {
            let raw = std::fs::read_to_string(&event)?;
            let event = UserCreatedEvent::from_json(&raw)?;
            match simulate(&manifest, &event, &password).await? {
                SimulationOutcome::Delivered(notification) => println!("{}", notification),
                SimulationOutcome::Skipped { event_name } => println!(
                    "⏭️  Event {} not matched by rule '{}'",
                    event_name.as_deref().unwrap_or("<unnamed>"),
                    manifest.rule.name
                ),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
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
