use std::time::Duration;

use clap::{Parser, Subcommand};
use easel_cli::demo::{self, DemoOptions};
use easel_cli::verify;
use easel_cli::window::{demo_script, ScriptedWindow};
use easel_core::{default_config_path, EaselConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Easel - GPU resource lifecycle and command deferral core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted headless demo on the null backend
    Demo {
        /// Defer API calls until flush/present (overrides the config file)
        #[arg(long)]
        defer: bool,

        /// Maximum number of frames to render
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run built-in lifecycle checks in both execution modes
    Verify {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration
    Config {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            defer,
            frames,
            config,
            json,
        } => {
            let config_path = config.unwrap_or_else(default_config_path);
            let config = EaselConfig::load_or_default(&config_path);
            easel_common::init_logging_with(&config.logging.filter);

            let mut settings = config.settings;
            settings.defer_api_calls |= defer;
            info!(
                "starting demo ({} frames, deferred={})",
                frames, settings.defer_api_calls
            );

            let ctx = easel_null::new_context(settings)?;
            let options = DemoOptions {
                frames,
                frame_interval: Duration::from_millis(16),
                ..DemoOptions::default()
            };
            let mut window = ScriptedWindow::spawn(
                demo_script(options.width * 2, options.height * 2),
                Duration::from_millis(100),
            );
            let summary = demo::run(ctx, &mut window, &options);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Rendered {} frames", summary.frames_rendered);
                println!(
                    "Swapchain resized {} times, final size {}x{}",
                    summary.resizes, summary.final_size.width, summary.final_size.height
                );
                if summary.closed_by_window {
                    println!("Window closed by script");
                }
                if summary.leaks.is_empty() {
                    println!("No leaks");
                } else {
                    println!("Leak count: {}", summary.leaks.count());
                    for leak in &summary.leaks.leaks {
                        println!("  {} {}", leak.kind, leak.handle);
                    }
                }
            }
        }

        Commands::Verify { config, json } => {
            easel_common::init_logging_with("warn");
            let config_path = config.unwrap_or_else(default_config_path);
            verify::run_verify(&config_path, json)?;
        }

        Commands::Config { output } => {
            easel_common::init_logging();
            let text = EaselConfig::default().to_toml_string()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    info!("wrote default configuration to {}", path);
                }
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}
