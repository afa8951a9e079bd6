use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-pack",
    about = "Directory-aware batch image compression with ZIP export",
    long_about = "img-pack compresses images in bulk: it collects images from a directory, a glob or a single file, \
                  fits them into a bounding box, re-encodes them (JPEG, PNG, WebP, AVIF or their original format) \
                  and exports the results as a single file or as a ZIP archive that can mirror the source layout.",
    version,
    after_help = "EXAMPLES:\n  \
    img-pack compress photo.png photo.jpg -q 0.85 -w 1280\n  \
    img-pack batch ./photos -o ./out -f webp --preserve-structure\n  \
    img-pack batch \"./photos/**/*.jpg\" -o ./out\n  \
    img-pack scan ./photos\n  \
    img-pack info photo.png"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-file details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a single image file",
        long_about = "Compress a single image file into the given output path. \
                      The output format comes from --format, then from the output extension, \
                      and otherwise stays the same as the input."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (0.0-1.0, default: 0.8)",
            long_help = "Encoder quality from 0.0 (smallest) to 1.0 (best). \
                         For PNG: >=0.9 uses Zopfli, >=0.7 uses high compression, <0.7 uses standard compression."
        )]
        quality: Option<f32>,

        #[arg(
            short = 'w',
            long,
            help = "Maximum width in pixels (default: 1920)",
            long_help = "Images wider than this are scaled down uniformly. Images are never upscaled."
        )]
        max_width: Option<u32>,

        #[arg(
            short = 'H',
            long,
            help = "Maximum height in pixels (default: 1080)",
            long_help = "Images taller than this are scaled down uniformly. Images are never upscaled."
        )]
        max_height: Option<u32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (original, jpeg, png, webp, avif)"
        )]
        format: Option<String>,
    },

    #[command(
        about = "Compress many images and export them",
        long_about = "Collect images from a directory (walked recursively), a glob pattern or a single file, \
                      compress them in parallel and export the results. A single result is saved directly; \
                      several results, or --preserve-structure, produce a ZIP archive."
    )]
    Batch {
        #[arg(
            help = "Input directory, file or glob",
            long_help = "Input can be a directory path, a single file, or a glob expression. \
                         Examples: './photos', 'photo.png', './photos/**/*.jpg'"
        )]
        input: String,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory the export is saved into"
        )]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (0.0-1.0, default: 0.8)"
        )]
        quality: Option<f32>,

        #[arg(short = 'w', long, help = "Maximum width in pixels (default: 1920)")]
        max_width: Option<u32>,

        #[arg(short = 'H', long, help = "Maximum height in pixels (default: 1080)")]
        max_height: Option<u32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (original, jpeg, png, webp, avif)",
            long_help = "Convert all images to the given format. \
                         If not specified, each image keeps its original format."
        )]
        format: Option<String>,

        #[arg(
            short = 'p',
            long,
            help = "Mirror the source directory layout inside the archive"
        )]
        preserve_structure: bool,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)",
            long_help = "Upper bound on parallel workers. The actual count may be lower \
                         when images are large or memory is short."
        )]
        threads: Option<usize>,
    },

    #[command(
        about = "Show the images a batch would pick up",
        long_about = "Collect images exactly like `batch` does and print directory statistics and the file tree."
    )]
    Scan {
        #[arg(help = "Input directory, file or glob")]
        input: String,
    },

    #[command(
        about = "Display image information",
        long_about = "Display dimensions, type and size of an image along with compression suggestions."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}
