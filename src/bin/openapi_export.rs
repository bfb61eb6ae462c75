use std::{fs, path::PathBuf};

use bakehouse_api::openapi::ApiDocV1;
use clap::Parser;
use utoipa::OpenApi;

/// Writes the OpenAPI document to disk
#[derive(Parser, Debug)]
#[command(name = "openapi-export")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "openapi")]
    out_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let json = serde_json::to_string_pretty(&ApiDocV1::openapi())?;

    fs::create_dir_all(&args.out_dir)?;
    let output_path = args.out_dir.join("bakehouse-api.v1.json");
    fs::write(&output_path, json)?;

    println!("OpenAPI spec written to {}", output_path.display());
    Ok(())
}
