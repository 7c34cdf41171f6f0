//! Image transforms that rewrite a file in place.
//!
//! The batch core only sees the [`ImageTransform`] trait. Two variants ship with the
//! crate: [`MagickTransform`] shells out to ImageMagick's `convert`, and
//! [`NativeTransform`] re-encodes in process with the `image` and `oxipng` crates.
//! Both write to a sibling temporary file and rename it over the original, so a
//! failed transform leaves the original untouched.

use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAGICK_PROGRAM, MAX_LEVEL, MIN_LEVEL,
    OXIPNG_PRESET, TEMP_FILE_PREFIX, ZOPFLI_ITERATIONS,
};
use crate::error::{Result, ShrinkError};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use oxipng::{Deflaters, Options};
use serde::Deserialize;
use std::fs::{self, Permissions};
use std::io::{self, Cursor, Write};
use std::num::NonZeroU8;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile, TempPath};

/// Rewrites the image at `path` with a smaller encoding.
pub trait ImageTransform: Send + Sync {
    fn process(&self, path: &Path) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Which transform implementation a batch uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// ImageMagick `convert`
    #[default]
    Magick,
    /// In-process re-encoding
    Native,
}

impl Engine {
    pub fn build(self, level: u8) -> Result<Arc<dyn ImageTransform>> {
        let transform: Arc<dyn ImageTransform> = match self {
            Engine::Magick => Arc::new(MagickTransform::new(level)?),
            Engine::Native => Arc::new(NativeTransform::new(level)?),
        };
        Ok(transform)
    }
}

pub fn validate_level(level: u8) -> Result<u8> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(ShrinkError::InvalidLevel(level));
    }
    Ok(level)
}

#[derive(Debug, Clone)]
pub struct MagickTransform {
    level: u8,
    program: String,
}

impl MagickTransform {
    pub fn new(level: u8) -> Result<Self> {
        Self::with_program(level, MAGICK_PROGRAM)
    }

    pub fn with_program(level: u8, program: impl Into<String>) -> Result<Self> {
        Ok(Self {
            level: validate_level(level)?,
            program: program.into(),
        })
    }
}

impl ImageTransform for MagickTransform {
    fn process(&self, path: &Path) -> Result<()> {
        let permissions = fs::metadata(path)?.permissions();

        // Same extension as the source so convert keeps the format.
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let temp_path = Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(parent_dir(path))?
            .into_temp_path();

        let output = Command::new(&self.program)
            .arg(path)
            .arg("-quality")
            .arg(format!("{}%", self.level))
            .arg(temp_path.as_os_str())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ShrinkError::ToolNotFound(self.program.clone()),
                _ => ShrinkError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("{} exited with {}", self.program, output.status),
                message => format!("{} exited with {}: {}", self.program, output.status, message),
            };
            return Err(ShrinkError::TransformFailed {
                path: path.to_path_buf(),
                reason,
            });
        }

        replace_original(temp_path, path, permissions)
    }

    fn name(&self) -> &'static str {
        "magick"
    }
}

#[derive(Debug, Clone)]
pub struct NativeTransform {
    level: u8,
}

impl NativeTransform {
    pub fn new(level: u8) -> Result<Self> {
        Ok(Self {
            level: validate_level(level)?,
        })
    }

    fn encode(&self, img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Jpeg => self.encode_jpeg(img),
            ImageFormat::Png => self.encode_png(img),
            ImageFormat::WebP => {
                let mut buffer = Cursor::new(Vec::new());
                img.write_to(&mut buffer, ImageFormat::WebP)?;
                Ok(buffer.into_inner())
            }
            other => Err(ShrinkError::UnsupportedFormat(format!("{:?}", other))),
        }
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.level);
            match img.color() {
                ColorType::L8 | ColorType::Rgb8 => {
                    encoder.encode(img.as_bytes(), img.width(), img.height(), img.color().into())?;
                }
                // JPEG has no alpha channel
                _ => {
                    let rgb = img.to_rgb8();
                    encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
                }
            }
        }
        Ok(buffer)
    }

    fn encode_png(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;

        let mut options = Options::from_preset(OXIPNG_PRESET);
        options.force = true;
        options.deflate = png_deflater(self.level);

        oxipng::optimize_from_memory(buffer.get_ref(), &options)
            .map_err(|e| ShrinkError::PngOptimization(e.to_string()))
    }
}

impl ImageTransform for NativeTransform {
    fn process(&self, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)
            .map_err(|_| ShrinkError::UnsupportedFormat(path.display().to_string()))?;

        let permissions = fs::metadata(path)?.permissions();
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let encoded = self.encode(&img, format)?;

        let mut temp: NamedTempFile = Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(parent_dir(path))?;
        temp.write_all(&encoded)?;
        replace_original(temp.into_temp_path(), path, permissions)
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// Higher levels trade time for smaller PNG output.
fn png_deflater(level: u8) -> Deflaters {
    if level >= 90 {
        if let Some(iterations) = NonZeroU8::new(ZOPFLI_ITERATIONS) {
            return Deflaters::Zopfli { iterations };
        }
    }

    if level >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}

/// Renames the finished temp file over `path`, carrying the original's mode across.
fn replace_original(temp_path: TempPath, path: &Path, permissions: Permissions) -> Result<()> {
    fs::set_permissions(&temp_path, permissions)?;
    temp_path.persist(path).map_err(|e| ShrinkError::Io(e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
