#![allow(dead_code)]

use img_shrink::{ImageTransform, Result, ShrinkError, ShrinkReporter, ShrinkResult, Totals};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Transform that rewrites files to a chosen size and records how it was called.
#[derive(Default)]
pub struct FakeTransform {
    new_sizes: HashMap<PathBuf, u64>,
    failing: HashSet<PathBuf>,
    delays: HashMap<PathBuf, Duration>,
    default_delay: Duration,
    calls: Mutex<Vec<PathBuf>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shrink_to(mut self, path: &Path, size: u64) -> Self {
        self.new_sizes.insert(path.to_path_buf(), size);
        self
    }

    pub fn fail_on(mut self, path: &Path) -> Self {
        self.failing.insert(path.to_path_buf());
        self
    }

    pub fn delay(mut self, path: &Path, delay: Duration) -> Self {
        self.delays.insert(path.to_path_buf(), delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl ImageTransform for FakeTransform {
    fn process(&self, path: &Path) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(path.to_path_buf());

        let delay = self.delays.get(path).copied().unwrap_or(self.default_delay);
        thread::sleep(delay);

        let result = if self.failing.contains(path) {
            Err(ShrinkError::TransformFailed {
                path: path.to_path_buf(),
                reason: "fake transform failure".to_string(),
            })
        } else {
            match self.new_sizes.get(path) {
                Some(&size) => fs::write(path, vec![0u8; size as usize]).map_err(ShrinkError::from),
                None => Ok(()),
            }
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub results: Vec<ShrinkResult>,
    pub totals: Totals,
}

/// Reporter whose calls can be inspected after it has been boxed.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl ShrinkReporter for RecordingReporter {
    fn report(&mut self, results: &[ShrinkResult], totals: &Totals) -> Result<()> {
        self.reports.lock().unwrap().push(Report {
            results: results.to_vec(),
            totals: *totals,
        });
        Ok(())
    }
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_file(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![7u8; len]).unwrap();
    path
}

pub fn create_test_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    img.save(&path).unwrap();
    path
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
