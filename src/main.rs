use anyhow::{Context, Result};
use clap::Parser;
use config::{LoadedSchema, MinioConfig, NamingConfig, SchemaLoader, SourceKind};
use processor::NameComposer;
use report::{Sheet, SheetWriter, Workbook, sanitize_sheet_name};
use std::path::{Path, PathBuf};
use storage::{JsonExportSource, MinioProductSource, ProductSource};
use tracing::{error, info, warn};

mod config;
mod models;
mod processor;
mod report;
mod storage;

#[derive(Parser)]
#[command(name = "product-naming")]
#[command(about = "Builds canonical product names from naming schemas and flags missing data")]
struct Args {
    /// Path to the run configuration
    #[arg(short, long, default_value = "naming.toml")]
    config: String,

    /// Schema directory (overrides schemas.dir)
    #[arg(short, long)]
    schemas: Option<PathBuf>,

    /// Output directory (overrides output.dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Degrade malformed descriptors to missing values instead of rejecting the schema
    #[arg(long)]
    lenient: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("🚀 Starting product naming audit");
    info!("Loading schemas from: {}", config.schemas.dir.display());

    let loader = SchemaLoader::new(config.schemas.strict);
    let schemas = loader.load_dir(&config.schemas.dir)?;
    if schemas.is_empty() {
        warn!("⚠️ No valid schemas to process");
        return Ok(());
    }
    info!("Loaded {} schemas", schemas.len());

    let source = build_source(&config)?;
    info!("Reading products through the '{}' source", source.name());

    let mut workbook = Workbook::new();
    let mut total_products = 0;
    let mut successful_schemas = 0;

    for loaded in &schemas {
        info!("\n=== Processing schema: {} ===", loaded.schema.category_key);

        match process_schema(loaded, source.as_ref()).await {
            Ok(Some(sheet)) => {
                total_products += sheet.rows.len();
                successful_schemas += 1;
                let added = workbook.add_sheet(sheet);
                info!(
                    "✅ Sheet '{}': {} products, {} with missing fields",
                    added.name,
                    added.rows.len(),
                    added.incomplete_rows()
                );
            }
            Ok(None) => {
                successful_schemas += 1;
                warn!("No products found for {}", loaded.schema.category_key);
            }
            Err(e) => {
                error!("❌ Failed to process {}: {:#}", loaded.file_name, e);
                // Continue with other schemas even if one fails
            }
        }
    }

    info!("\n=== Naming Audit Summary ===");
    info!("✅ Processed {} out of {} schemas", successful_schemas, schemas.len());
    info!("📊 Total products processed: {}", total_products);

    if workbook.is_empty() {
        warn!("⚠️ No products to write, skipping workbook");
        return Ok(());
    }

    let writer = SheetWriter::new(
        &config.output.dir,
        config.output.workbook.as_str(),
        config.output.format,
    );
    let written = writer.write_workbook(&workbook)?;
    info!(
        "🎉 Workbook written to {} ({} files)",
        writer.target().display(),
        written.len()
    );

    Ok(())
}

fn load_config(args: &Args) -> Result<NamingConfig> {
    let mut config = if Path::new(&args.config).exists() {
        NamingConfig::from_file(&args.config)?
    } else {
        warn!("Config file not found: {}, using defaults", args.config);
        NamingConfig::default()
    };

    if let Some(dir) = &args.schemas {
        config.schemas.dir = dir.clone();
    }
    if let Some(dir) = &args.output {
        config.output.dir = dir.clone();
    }
    if args.lenient {
        config.schemas.strict = false;
    }

    Ok(config)
}

fn build_source(config: &NamingConfig) -> Result<Box<dyn ProductSource>> {
    match config.source.kind {
        SourceKind::Json => Ok(Box::new(JsonExportSource::new(&config.source.export_dir))),
        SourceKind::Minio => {
            let section = config
                .minio
                .as_ref()
                .context("source.kind = \"minio\" requires a [minio] section")?;
            let minio_config = MinioConfig::from_section(section)
                .context("Failed to load MinIO configuration")?;
            info!(
                "Loaded MinIO configuration: {}@{}",
                minio_config.endpoint, minio_config.bucket_name
            );
            Ok(Box::new(
                MinioProductSource::from_config(&minio_config)
                    .context("Failed to initialize MinIO source")?,
            ))
        }
    }
}

async fn process_schema(loaded: &LoadedSchema, source: &dyn ProductSource) -> Result<Option<Sheet>> {
    let schema = &loaded.schema;
    info!("Collection: {}", schema.collection);

    let products = source.products_for(schema).await?;
    if products.is_empty() {
        return Ok(None);
    }

    let composer = NameComposer::new(&schema.structure);
    let sheet_name = sanitize_sheet_name(&schema.category_key)?;
    Ok(Some(Sheet::for_products(sheet_name, &composer, &products)))
}
