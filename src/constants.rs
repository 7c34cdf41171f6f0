pub const DEFAULT_LEVEL: u8 = 80;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;

pub const DEFAULT_CONCURRENCY: usize = 4;

pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

// Configuration sources
pub const CONFIG_FILE_NAME: &str = ".img-shrink.yaml";
pub const ENV_PREFIX: &str = "IMG_SHRINK";

// External tool used by the shell transform
pub const MAGICK_PROGRAM: &str = "convert";

pub const TEMP_FILE_PREFIX: &str = ".img-shrink-";

pub const OXIPNG_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

/// Extensions picked up when a pattern resolves to a directory.
pub const DIRECTORY_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "avif",
];
