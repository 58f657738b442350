mod config;
mod error;
mod store;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrine_core::{CatalogManager, ImageFile, ImageInput, Submission};

use crate::config::{load_config, resolve_store_config};
use crate::error::VtError;
use crate::store::{StoreType, open_backend};
use crate::view::{render_cards, render_detail};

#[derive(Parser)]
#[command(name = "vt")]
#[command(about = "Vitrine storefront catalog", long_about = None)]
struct Cli {
    /// Store type: fjall or rocks
    #[arg(long, global = true)]
    store_type: Option<StoreType>,

    /// Path to the catalog store
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a product to the catalog
    Add {
        /// Product name
        #[arg(long)]
        name: String,

        /// Price, a positive number
        #[arg(long)]
        price: f64,

        #[arg(long)]
        description: Option<String>,

        /// Main image: a file path or an http(s) URL
        #[arg(long)]
        image: String,

        /// Additional image, may be repeated
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
    /// List all products
    List,
    /// Show one product in detail
    Show {
        /// Catalog index, as printed by `list`
        index: usize,

        /// Display this thumbnail as the main image
        #[arg(long)]
        promote: Option<usize>,
    },
}

async fn image_input(arg: &str) -> ImageInput {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        ImageInput::Url(arg.to_string())
    } else {
        ImageInput::File(ImageFile::from_path(arg).await)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    let settings = resolve_store_config(&config, cli.store_type, cli.store);
    let backend = open_backend(settings.store_type, &settings.path, settings.capacity).map_err(VtError::from)?;
    let mut manager = CatalogManager::open(backend, config.limits)
        .await
        .map_err(VtError::from)?;

    match cli.command {
        Command::Add {
            name,
            price,
            description,
            image,
            extras,
        } => {
            let mut other_images = Vec::with_capacity(extras.len());
            for extra in &extras {
                other_images.push(image_input(extra).await);
            }
            let submission = Submission {
                name,
                price: Some(price),
                description,
                main_image: Some(image_input(&image).await),
                other_images,
            };

            let report = manager.submit(submission).await.map_err(VtError::from)?;
            for skipped in &report.skipped {
                eprintln!("Skipped image {}: {}", skipped.label, skipped.error);
            }
            println!("Added product [{}]", report.index);
        }
        Command::List => {
            print!("{}", render_cards(&manager.cards(), &config.currency));
        }
        Command::Show { index, promote } => {
            let mut view = manager.detail(index).ok_or(VtError::NotFound(index))?;
            if let Some(thumbnail) = promote {
                if !view.promote(thumbnail) {
                    return Err(VtError::NoThumbnail { index, thumbnail }.into());
                }
            }
            print!("{}", render_detail(&view, &config.currency));
        }
    }

    Ok(())
}
