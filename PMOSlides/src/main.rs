use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmoconfig::get_config;
use pmodrive::{DriveClient, DriveConfigExt, FolderAggregator};
use pmoslideshow::{
    ConfigStore, DEFAULT_MAIN_TITLE, DisplayConfig, DisplayConfigExt, LoopingViewport,
    PresentationController, PresentationEvent, TransitionMode, session,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "pmoslides",
    version,
    about = "Photo slideshow fed by a cloud folder tree"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every image below a folder with its parent folder name
    Aggregate {
        /// Folder id or share link (defaults to the configured folder)
        #[arg(long)]
        folder: Option<String>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Read or change the display settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run the slideshow in the terminal
    Play {
        /// Number of slides to show
        #[arg(long, default_value_t = 20)]
        slides: usize,

        /// Override the autoplay delay
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored display settings
    Show,

    /// Update the display settings; omitted fields keep their value
    Set {
        #[arg(long)]
        folder: Option<String>,

        #[arg(long)]
        main_title: Option<String>,

        #[arg(long)]
        sub_title: Option<String>,

        /// slide, fade, cube, coverflow, cards, creative or random
        #[arg(long)]
        transition: Option<String>,
    },
}

fn init_logging(config: &pmoconfig::Config) {
    let level = config
        .get_log_min_level()
        .ok()
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let enable_console = config.get_log_enable_console().unwrap_or(true);
    let registry = tracing_subscriber::registry().with(filter);
    if enable_console {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true),
            )
            .init();
    } else {
        registry.init();
    }
}

fn aggregator(config: &pmoconfig::Config) -> Result<FolderAggregator<DriveClient>> {
    let client = DriveClient::from_config_obj(config)?;
    let options = config.get_drive_aggregator_options()?;
    Ok(FolderAggregator::with_options(Arc::new(client), options))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = get_config();
    init_logging(&config);

    match cli.cmd {
        Commands::Aggregate { folder, json } => {
            let folder_id = match folder {
                Some(f) => pmoslideshow::normalize_folder_id(&f),
                None => config
                    .load_display_config()
                    .await?
                    .unwrap_or_default()
                    .folder_id,
            };
            if folder_id.is_empty() {
                anyhow::bail!("No folder given and none configured");
            }

            let result = aggregator(&config)?.aggregate(&folder_id).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{} ({} images)", result.root_name, result.len());
                for image in &result.images {
                    println!("  [{}] {}", image.folder_name, image.url);
                }
                for failure in &result.failed_folders {
                    warn!("Skipped folder {}: {}", failure.folder_id, failure.reason);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let display = config.load_display_config().await?.unwrap_or_default();
                print_display_config(&display);
            }
            ConfigAction::Set {
                folder,
                main_title,
                sub_title,
                transition,
            } => {
                let mut display = config.load_display_config().await?.unwrap_or_default();
                if let Some(folder) = folder {
                    display.folder_id = folder;
                }
                if let Some(title) = main_title {
                    display.main_title = title;
                }
                if let Some(sub) = sub_title {
                    display.sub_title = Some(sub).filter(|s| !s.is_empty());
                }
                if let Some(t) = transition {
                    display.transition_mode = t.parse::<TransitionMode>()?;
                }
                let saved = config.save_display_config(&display).await?;
                print_display_config(&saved);
            }
        },

        Commands::Play { slides, delay_ms } => {
            let mut settings = config.get_viewport_settings()?;
            if let Some(ms) = delay_ms {
                settings.autoplay_delay = Duration::from_millis(ms);
            }

            let source = aggregator(&config)?;
            let mut controller = PresentationController::new();
            session::load_session(&mut controller, config.as_ref(), &source)
                .await
                .context("Cannot load the slideshow")?;

            println!("== {} ==", controller.main_title());
            if controller.images().is_empty() {
                println!("(no image in this album)");
                return Ok(());
            }
            if let Some(caption) = controller.caption() {
                println!("-- {}", caption);
            }

            let mut viewport = LoopingViewport::new(settings);
            let shown = session::play(
                &mut controller,
                &mut viewport,
                &settings,
                slides,
                |index, events| {
                    for event in events {
                        match event {
                            PresentationEvent::TransitionChanged(t) => println!("   ~ {}", t),
                            PresentationEvent::CaptionChanged(c) => println!("-- {}", c),
                        }
                    }
                    println!("   #{}", index);
                },
            )
            .await?;
            info!("{} slide(s) shown", shown);
        }
    }

    Ok(())
}

fn print_display_config(display: &DisplayConfig) {
    print!("{}", format_display_config(display));
}

/// Stored values as-is; unset fields show the default in effect
fn format_display_config(display: &DisplayConfig) -> String {
    let main_title = if display.main_title.trim().is_empty() {
        format!("- (default: {})", DEFAULT_MAIN_TITLE)
    } else {
        display.main_title.clone()
    };
    format!(
        "folder_id:       {}\nmain_title:      {}\nsub_title:       {}\ntransition_mode: {}\n",
        display.folder_id,
        main_title,
        display.sub_title.as_deref().unwrap_or("-"),
        display.transition_mode
    )
}
