use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use patch_engine::targets::resolve_count;
use patch_engine::{apply_payload, minimum_patch_len, select, Exclusions};

mod config;
mod inputs;

/// Overwrite selected instructions in a binary module with a payload.
///
/// Each target instruction is replaced by the payload followed by NOP
/// padding out to that instruction's own length, so no write ever
/// crosses an instruction boundary.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address list exported from the disassembler (first tab-separated
    /// field per line is a hex address)
    usage_file: Option<PathBuf>,
    /// Payload as whitespace-separated hex bytes
    payload_file: Option<PathBuf>,
    /// Config file with default_values and/or pinned settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Module image to patch
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Where to write the patched image
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// First address-list index to patch
    #[arg(short, long)]
    start_index: Option<usize>,
    /// Number of targets; negative means the rest of the list
    #[arg(short = 'n', long, allow_hyphen_values = true)]
    count: Option<i64>,
    /// File of whitespace-separated decimal indices to skip
    #[arg(short, long)]
    blacklist_file: Option<PathBuf>,
    /// Indices to skip
    #[arg(short = 'B', long, num_args = 1..)]
    blacklist: Option<Vec<usize>>,
    /// Signed adjustment from listing address to image offset
    #[arg(short, long, allow_hyphen_values = true)]
    magic_offset: Option<i64>,
}

impl Args {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            usage_file: self.usage_file.clone(),
            payload_file: self.payload_file.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            start_index: self.start_index,
            count: self.count,
            blacklist_file: self.blacklist_file.clone(),
            blacklist: self.blacklist.clone(),
            magic_offset: self.magic_offset,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::BASE_CONFIG_PATH));
    let file = config::load(&config_path)?;
    let cfg = config::resolve(&args.overrides(), &file)?;

    let addresses = inputs::parse_address_list(&fs::read_to_string(&cfg.usage_file)?)?;
    let mut image = fs::read(&cfg.input)?;
    info!(
        "loaded {} ({} bytes), {} addresses from {}",
        cfg.input.display(),
        image.len(),
        addresses.len(),
        cfg.usage_file.display()
    );

    let file_blacklist = match &cfg.blacklist_file {
        Some(path) => inputs::parse_blacklist(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    let exclusions = Exclusions::merge(&cfg.blacklist, &file_blacklist);

    let count = resolve_count(addresses.len(), cfg.start_index, cfg.count);
    info!(
        "patching indices {}..{} ({count} before exclusions)",
        cfg.start_index,
        cfg.start_index + count
    );
    if !exclusions.is_empty() {
        info!("excluded indices: {exclusions}");
    }

    let targets = select(&addresses, cfg.start_index, cfg.count, &exclusions)?;
    let minimum = minimum_patch_len(&image, &targets, cfg.magic_offset)?;
    info!("minimum instruction length: {minimum} bytes");

    let payload = inputs::parse_payload(&fs::read_to_string(&cfg.payload_file)?)?;
    info!(
        "payload bytes: {}",
        payload
            .iter()
            .map(|b| format!("{b:#04x}"))
            .collect::<Vec<_>>()
            .join(" ")
    );

    apply_payload(&mut image, &targets, cfg.magic_offset, &payload, minimum)?;

    fs::write(&cfg.output, &image)?;
    info!("wrote {} ({} bytes)", cfg.output.display(), image.len());
    Ok(())
}
