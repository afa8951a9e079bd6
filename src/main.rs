use anyhow::{Context, Result};
use clap::Parser;
use img_pack::cli::{Args, Commands};
use img_pack::logger;
use img_pack::utils::{create_progress_spinner, format_file_size, print_compression_result};
use img_pack::validation::validate_input_path;
use img_pack::{
    build_directory_tree, collect, compress_batch, compress_source, determine_output_format,
    directory_stats, export, get_image_info, info, print_image_info, render_tree, warn,
    CompressionOptions, DirectorySink, ExportOutcome, OutputFormat, RasterBackend, SourceFile,
};
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            quality,
            max_width,
            max_height,
            format,
        } => {
            let format = determine_output_format(&output, format.as_deref())?;
            let options = CompressionOptions::new(quality, max_width, max_height, Some(format))?;
            compress_single(&input, &output, &options)?;
        }
        Commands::Batch {
            input,
            output,
            quality,
            max_width,
            max_height,
            format,
            preserve_structure,
            threads,
        } => {
            let format = match format {
                Some(format) => format.parse::<OutputFormat>()?,
                None => OutputFormat::Original,
            };
            let options = CompressionOptions::new(quality, max_width, max_height, Some(format))?;
            run_batch(&input, output, &options, preserve_structure, threads)?;
        }
        Commands::Scan { input } => {
            scan(&input)?;
        }
        Commands::Info { input } => {
            info!("📋 Getting info for: {:?}", input);
            let image_info = get_image_info(&input)?;
            print_image_info(&image_info);
        }
    }

    Ok(())
}

fn compress_single(input: &Path, output: &Path, options: &CompressionOptions) -> Result<()> {
    validate_input_path(input)?;
    info!("🗜️  Compressing image: {:?}", input);

    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = SourceFile::from_disk(input, name.clone(), name)?;

    let spinner = create_progress_spinner("Compressing...");
    let result = compress_source(&source, options, &RasterBackend::new());
    spinner.finish_and_clear();
    let result = result?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    fs::write(output, &result.compressed.data)
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!(
        "📁 Output: {:?} ({}x{}, {})",
        output, result.compressed.width, result.compressed.height, result.compressed.mime_type
    );
    print_compression_result(source.size, result.compressed.size());
    Ok(())
}

fn run_batch(
    input: &str,
    output: PathBuf,
    options: &CompressionOptions,
    preserve_structure: bool,
    threads: Option<usize>,
) -> Result<()> {
    info!("🚀 Starting batch compression...");
    info!("📁 Input: {}", input);
    info!("📁 Output: {:?}", output);

    let sources = collect(input).with_context(|| format!("Failed to collect {}", input))?;
    if sources.is_empty() {
        warn!("No image files found in the input path");
        return Ok(());
    }
    info!("📊 Found {} image files to process", sources.len());

    let report = compress_batch(&sources, options, &RasterBackend::new(), threads)?;
    report.print_summary();

    if report.results.is_empty() {
        warn!("No image could be compressed, nothing to export");
        return Ok(());
    }

    let outcome = export(
        &report.results,
        options.format,
        preserve_structure,
        &DirectorySink::new(output),
    )?;

    match outcome {
        ExportOutcome::SingleFile { name, .. } => info!("✅ Exported {}", name),
        ExportOutcome::Archive { name, entries, .. } => {
            info!("✅ Exported {} with {} files", name, entries.len())
        }
    }
    Ok(())
}

fn scan(input: &str) -> Result<()> {
    let sources = collect(input).with_context(|| format!("Failed to collect {}", input))?;
    if sources.is_empty() {
        warn!("No image files found in the input path");
        return Ok(());
    }

    let stats = directory_stats(&sources);
    info!("📊 Directory statistics:");
    info!("  📁 Files: {}", stats.total_files);
    info!("  📦 Total size: {}", format_file_size(stats.total_size));
    info!("  🗂️  Directories: {}", stats.directory_count);
    info!("  📏 Max depth: {}", stats.max_depth);
    for (subtype, count) in &stats.file_types {
        info!("  🎭 {}: {}", subtype, count);
    }

    info!("\n{}", render_tree(&build_directory_tree(&sources)));
    Ok(())
}
