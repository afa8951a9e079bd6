pub mod logger;

pub mod backend;
pub mod batch;
pub mod cli;
pub mod collector;
pub mod constants;
pub mod error;
pub mod export;
pub mod formats;
pub mod info;
pub mod processing;
pub mod tree;
pub mod utils;
pub mod validation;

pub use backend::{Background, ImageBackend, RasterBackend};
pub use batch::{compress_batch, BatchFailure, BatchReport};
pub use collector::{
    collect, collect_from_entry, collect_from_entry_blocking, collect_from_listing, infer_root,
    is_image_file, strip_root, ListedFile, SourceFile,
};
pub use error::{CompressionError, Result};
pub use export::{export, DirectorySink, DownloadSink, ExportOutcome};
pub use formats::{determine_output_format, ImageKind, OutputFormat, FALLBACK_KIND};
pub use info::{get_image_info, print_image_info, ImageInfo};
pub use processing::{
    calculate_dimensions, compress, compress_bytes, compress_source, Blob, CompressedResult,
    CompressionOptions,
};
pub use tree::{build_directory_tree, directory_stats, render_tree, DirectoryStats};
