pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod expand;
pub mod logger;
pub mod report;
pub mod transform;
pub mod worker;

pub use batch::{dispatch, BatchOptions, BatchOutcome, Shrinker};
pub use crate::config::{Overrides, Settings};
pub use error::{Result, ShrinkError};
pub use expand::{expand_patterns, is_image_file, ExpandOptions};
pub use report::{format_sizes, ConsoleReporter, ShrinkReporter, Totals};
pub use transform::{Engine, ImageTransform, MagickTransform, NativeTransform};
pub use worker::{shrink_file, shrink_percentage, ProcessingError, ShrinkResult};
