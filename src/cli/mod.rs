//! # CLI Module
//!
//! Headless companion to the camera UI.
//!
//! ## Usage
//! ```bash
//! # Ordered listing of the image directory
//! picam-darkroom library list
//!
//! # What the exposure labels would read in manual mode
//! picam-darkroom exposure describe --iso-index 8 --shutter-index 11
//!
//! # Save a filtered copy next to the original
//! picam-darkroom --dir ./images filters apply 3.jpg clarendon
//! ```

use clap::{Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use picam_darkroom::config::{ConfigManager, DarkroomConfig};
use picam_darkroom::core::camera::LoggingDriver;
use picam_darkroom::core::exposure::ExposureController;
use picam_darkroom::core::filters::FilterName;
use picam_darkroom::core::library::ImageLibrary;
use picam_darkroom::core::studio::{write_jpeg, Studio};
use picam_darkroom::error::Result;
use picam_darkroom::events::{null_sender, Event, EventChannel, LibraryEvent};
use std::path::{Path, PathBuf};
use tracing::warn;

/// picam-darkroom - exposure and image library tools for the Pi camera
#[derive(Parser, Debug)]
#[command(name = "picam-darkroom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Image directory, overriding the configuration
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and manage the image directory
    Library {
        #[command(subcommand)]
        command: LibraryCommand,
    },
    /// Exposure tables and readouts
    Exposure {
        #[command(subcommand)]
        command: ExposureCommand,
    },
    /// Cosmetic filters
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryCommand {
    /// List images in display order
    List {
        /// JSON output for scripting
        #[arg(long)]
        json: bool,
    },
    /// Print the id the next capture would use
    NextId,
    /// Delete an image by file name
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum ExposureCommand {
    /// Every shutter position with its speed
    Table,
    /// Drive the controller and print the resulting readout
    Describe {
        #[arg(long)]
        iso_index: i64,

        #[arg(long)]
        shutter_index: i64,

        /// Switch back to auto exposure afterwards
        #[arg(long)]
        auto: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FiltersCommand {
    /// Enabled filters in menu order
    List,
    /// Save a full-size filtered copy as <stem>.JPG
    Apply { name: String, filter: String },
    /// Render every enabled filter at preview size
    Preview {
        name: String,

        /// Output directory for the previews
        #[arg(long)]
        out: PathBuf,
    },
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ConfigManager::default_path);
    let mut config = ConfigManager::load(&config_path)?;
    if let Some(dir) = cli.dir {
        config.image_dir = dir;
    }

    let term = Term::stdout();
    match cli.command {
        Commands::Library { command } => run_library(&term, config, command),
        Commands::Exposure { command } => run_exposure(&term, config, command),
        Commands::Filters { command } => run_filters(&term, config, command),
    }
}

fn studio(config: &DarkroomConfig) -> Result<Studio> {
    Studio::builder()
        .image_dir(&config.image_dir)
        .exposure_settings(config.exposure.clone())
        .library_config(config.library.clone())
        .filters(config.filters.clone())
        .preview_window(config.preview)
        .crop_width(config.super_night_crop_width)
        .driver(Box::new(LoggingDriver::new()))
        .build()
}

fn run_library(term: &Term, config: DarkroomConfig, command: LibraryCommand) -> Result<()> {
    match command {
        LibraryCommand::List { json } => {
            let (sender, receiver) = EventChannel::new();
            let mut library = ImageLibrary::new(&config.image_dir, config.library.clone(), sender);
            let outcome = library.refresh(true)?;

            if json {
                match serde_json::to_string_pretty(&outcome.images) {
                    Ok(output) => println!("{}", output),
                    Err(e) => warn!("Failed to serialise listing: {}", e),
                }
                return Ok(());
            }

            for image in &outcome.images {
                term.write_line(&format!(
                    "{:>6}  {:<12} {}",
                    style(image.sort_key).cyan(),
                    style(image.kind).dim(),
                    image.file_name()
                ))
                .ok();
            }
            for event in receiver.drain() {
                if let Event::Library(LibraryEvent::Skipped { path, .. }) = event {
                    term.write_line(&format!(
                        "{} skipped {}",
                        style("!").yellow(),
                        path.display()
                    ))
                    .ok();
                }
            }
            term.write_line(&format!(
                "{} images in {}",
                style(outcome.images.len()).bold(),
                config.image_dir.display()
            ))
            .ok();
        }
        LibraryCommand::NextId => {
            let library = ImageLibrary::new(&config.image_dir, config.library, null_sender());
            println!("{}", library.next_capture_id()?);
        }
        LibraryCommand::Delete { name } => {
            let mut studio = studio(&config)?;
            let outcome = studio.delete(&name)?;
            term.write_line(&format!(
                "{} deleted {} ({} images left)",
                style("✓").green().bold(),
                name,
                outcome.images.len()
            ))
            .ok();
        }
    }
    Ok(())
}

fn run_exposure(term: &Term, config: DarkroomConfig, command: ExposureCommand) -> Result<()> {
    let shutter = &config.exposure.shutter;
    match command {
        ExposureCommand::Table => {
            for index in 0..shutter.len() as i64 {
                term.write_line(&format!(
                    "{:>3}  {:<12} {:>7} µs",
                    style(index).cyan(),
                    shutter.label(index)?,
                    shutter.micros(index)?
                ))
                .ok();
            }
        }
        ExposureCommand::Describe {
            iso_index,
            shutter_index,
            auto,
        } => {
            let mut controller = ExposureController::new(
                Box::new(LoggingDriver::new()),
                config.exposure.clone(),
                null_sender(),
            )?;
            controller.set_mode(false)?;
            controller.set_iso_index(iso_index)?;
            controller.set_shutter_index(shutter_index)?;
            if auto {
                controller.set_mode(true)?;
            }

            let readout = controller.describe();
            term.write_line(&format!(
                "{} {:?}  controls {}",
                style("mode").bold(),
                controller.mode(),
                if controller.controls_enabled() {
                    style("enabled").green()
                } else {
                    style("locked").yellow()
                }
            ))
            .ok();
            term.write_line(&format!("{} {}", style("ISO").bold(), readout.iso)).ok();
            term.write_line(&format!(
                "{} {} ({} µs)",
                style("Shutter").bold(),
                readout.shutter,
                controller.resolve_shutter_micros(shutter_index)?
            ))
            .ok();
        }
    }
    Ok(())
}

fn run_filters(term: &Term, config: DarkroomConfig, command: FiltersCommand) -> Result<()> {
    let mut studio = studio(&config)?;
    match command {
        FiltersCommand::List => {
            for name in studio.filters().enabled() {
                term.write_line(&name.to_string()).ok();
            }
        }
        FiltersCommand::Apply { name, filter } => {
            let filter: FilterName = filter.parse()?;
            let path = studio.save_filter(&name, filter)?;
            term.write_line(&format!(
                "{} wrote {}",
                style("✓").green().bold(),
                path.display()
            ))
            .ok();
        }
        FiltersCommand::Preview { name, out } => {
            let previews = studio.filter_previews(&name)?;
            std::fs::create_dir_all(&out)
                .map_err(|e| picam_darkroom::error::LibraryError::storage(&out, e))?;

            let pb = ProgressBar::new(previews.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓░"),
            );

            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            for preview in &previews {
                pb.set_message(preview.name.to_string());
                let path = out.join(format!("{}_{}.jpeg", stem, preview.name));
                write_jpeg(&preview.image, &path)?;
                pb.inc(1);
            }
            pb.finish_and_clear();

            term.write_line(&format!(
                "{} {} previews in {}",
                style("✓").green().bold(),
                previews.len(),
                out.display()
            ))
            .ok();
        }
    }
    Ok(())
}
