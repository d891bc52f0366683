use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use txtpos::{failure_message, list_page_dumps, usage};
use txtpos_core::{
    DocumentProcessor, JsonSourceLoader, OutputPaths, PipelineStages, SourceLoader, StepProfiler,
    TxtposConfig,
};

#[derive(Parser)]
#[command(name = "txtpos")]
#[command(about = "Rebuild text lines and rule-line grids from positioned word dumps")]
struct Args {
    /// Page dump (JSON) to process
    #[arg(short, long, conflicts_with = "directory")]
    file: Option<PathBuf>,

    /// Process every .json page dump directly inside this directory
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// First page to process (1-based)
    #[arg(short, long)]
    start: Option<u32>,

    /// Last page to process
    #[arg(short, long)]
    end: Option<u32>,

    /// Line height margin: max y1 distance to the current line reference
    #[arg(short = 'H', long)]
    height: Option<f64>,

    /// Sort tie-break delta for y2 / x1
    #[arg(short, long)]
    bottom: Option<f64>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Field delimiter of line records
    #[arg(long)]
    delimiter: Option<String>,

    /// Cell delimiter of grid records
    #[arg(long)]
    grid_delimiter: Option<String>,

    /// Also write grid records (<stem>.grid)
    #[arg(long)]
    grid: bool,

    /// Ignore column rules: each grid row becomes one cell.
    /// Rules still have to form a grid; for tables ruled only by horizontal
    /// lines set `grid.partition: single` in the config file
    #[arg(long)]
    no_vertical_lines: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs instead of writing records
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "stages")]
    stages_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("🦀 txtpos");

    let mut config = TxtposConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }
    apply_overrides(&mut config, &args);

    let inputs = match (&args.file, &args.directory) {
        (Some(file), _) => vec![file.clone()],
        (None, Some(dir)) => list_page_dumps(dir)?,
        (None, None) => {
            print!("\n{}", usage(&config.output.delimiter));
            return Ok(());
        }
    };

    if inputs.is_empty() {
        println!("⚠️  No .json page dumps found");
        return Ok(());
    }

    let processor = DocumentProcessor::new(config);
    let mut failed = 0;
    for input in &inputs {
        println!("\n📄 Processing: {}", input.display());
        let result = if args.dump_stages {
            dump_stages(&processor, input, &args.stages_dir)
        } else {
            process(&processor, input, args.profile)
        };
        if let Err(e) = result {
            eprintln!("{}", failure_message(input, &e));
            failed += 1;
        }
    }

    if inputs.len() > 1 {
        println!(
            "\n📊 {} documents, {} succeeded, {} failed",
            inputs.len(),
            inputs.len() - failed,
            failed
        );
    }
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut TxtposConfig, args: &Args) {
    if args.start.is_some() {
        config.pages.start = args.start;
    }
    if args.end.is_some() {
        config.pages.end = args.end;
    }
    if let Some(height) = args.height {
        config.line_clustering.line_margin = height;
    }
    if let Some(bottom) = args.bottom {
        config.line_clustering.sort_delta = bottom;
    }
    if let Some(delimiter) = &args.delimiter {
        config.output.delimiter = delimiter.clone();
    }
    if let Some(delimiter) = &args.grid_delimiter {
        config.grid.delimiter = delimiter.clone();
    }
    if args.grid {
        config.grid.enabled = true;
    }
    if args.no_vertical_lines {
        config.grid.use_vertical_lines = false;
    }
}

fn process(processor: &DocumentProcessor, input: &Path, profile: bool) -> Result<()> {
    let mut profiler = StepProfiler::new(profile);
    let summary = processor.process_file(input, &mut profiler)?;

    let paths = OutputPaths::for_input(input);
    println!("✅ Successfully processed document");
    println!("   - Pages: {}", summary.pages_processed);
    if summary.pages_failed > 0 {
        println!("   - ⚠️  Skipped pages: {}", summary.pages_failed);
    }
    println!("💾 {} ({} records)", paths.lines.display(), summary.word_records);
    if processor.config().grid.enabled {
        println!("💾 {} ({} rows)", paths.grid.display(), summary.grid_rows);
    }

    let lines = profiler.summary();
    if !lines.is_empty() {
        println!("\n📊 Performance Summary:");
        for line in lines {
            println!("   {line}");
        }
    }
    Ok(())
}

fn dump_stages(processor: &DocumentProcessor, input: &Path, stages_dir: &Path) -> Result<()> {
    println!("🔬 Pipeline stage dump mode");
    let source = JsonSourceLoader
        .open(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let stages = processor.capture_stages(&source)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output_dir = stages_dir.join(stem);
    save_stages(&stages, input, &output_dir)?;
    println!("✅ All stages dumped to: {}", output_dir.display());
    Ok(())
}

fn save_stages(stages: &PipelineStages, input: &Path, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    // Stage 1: pages as decoded
    let pages: Vec<_> = stages.pages.iter().map(|p| &p.page).collect();
    write_json(&output_dir.join("stage1_pages.json"), &pages)?;

    // Stage 2: line clustering
    let clustered: Vec<_> = stages.pages.iter().map(|p| &p.clustered).collect();
    write_json(&output_dir.join("stage2_clustered.json"), &clustered)?;

    // Stage 3: pipeline rules (number merge)
    let merged: Vec<_> = stages.pages.iter().map(|p| &p.merged).collect();
    write_json(&output_dir.join("stage3_merged.json"), &merged)?;

    // Stage 4: grids and their rows
    let grids: Vec<_> = stages
        .pages
        .iter()
        .map(|p| serde_json::json!({ "grids": p.grids, "rows": p.grid_rows }))
        .collect();
    write_json(&output_dir.join("stage4_grids.json"), &grids)?;

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input.display().to_string(),
        "source": stages.source,
        "captured_at": stages.captured_at.to_rfc3339(),
        "dumped_at": chrono::Utc::now().to_rfc3339(),
        "failed_pages": stages.failed_pages,
        "stage_counts": {
            "pages": stages.pages.len(),
            "words": stages.pages.iter().map(|p| p.page.words.len()).sum::<usize>(),
            "merged_words": stages.pages.iter().map(|p| p.merged.len()).sum::<usize>(),
            "grids": stages.pages.iter().map(|p| p.grids.len()).sum::<usize>(),
        }
    });
    write_json(&output_dir.join("summary.json"), &summary)?;

    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("  💾 {}", path.display());
    Ok(())
}
