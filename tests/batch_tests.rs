mod common;

use common::{create_file, create_temp_directory, path_string, FakeTransform, RecordingReporter};
use img_shrink::{
    format_sizes, BatchOptions, ShrinkError, ShrinkResult, Shrinker, Totals,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn shrinker(concurrency: usize, transform: Arc<FakeTransform>, reporter: &RecordingReporter) -> Shrinker {
    Shrinker::new(
        BatchOptions::new(concurrency).unwrap(),
        transform,
        Box::new(reporter.clone()),
    )
}

#[test]
fn test_single_file_with_missing_pattern() {
    let temp_dir = create_temp_directory();
    let a = create_file(temp_dir.path(), "a.jpg", 1000);
    let missing = path_string(&temp_dir.path().join("missing*.jpg"));

    let transform = Arc::new(FakeTransform::new().shrink_to(&a, 400));
    let reporter = RecordingReporter::new();
    let outcome = shrinker(4, transform.clone(), &reporter)
        .run(&[path_string(&a), missing])
        .unwrap();

    assert_eq!(outcome.successes, vec![ShrinkResult::new(a.clone(), 1000, 400)]);
    assert_eq!(outcome.failure_count(), 0);

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].results, vec![ShrinkResult::new(a, 1000, 400)]);
    assert_eq!(
        reports[0].totals,
        Totals {
            original_size: 1000,
            new_size: 400
        }
    );
    assert_eq!(
        format_sizes(reports[0].totals.original_size, reports[0].totals.new_size),
        "0.00 MB → 0.00 MB (60.00% smaller)"
    );
}

#[test]
fn test_no_patterns_means_nothing_to_do() {
    let transform = Arc::new(FakeTransform::new());
    let reporter = RecordingReporter::new();
    let patterns: Vec<String> = Vec::new();

    let outcome = shrinker(4, transform.clone(), &reporter).run(&patterns).unwrap();

    assert_eq!(outcome.processed(), 0);
    assert!(transform.calls().is_empty());
    assert!(reporter.reports().is_empty());
}

#[test]
fn test_all_patterns_match_nothing() {
    let temp_dir = create_temp_directory();
    let patterns = vec![
        path_string(&temp_dir.path().join("*.jpg")),
        path_string(&temp_dir.path().join("nothing.png")),
    ];
    let transform = Arc::new(FakeTransform::new());
    let reporter = RecordingReporter::new();

    let outcome = shrinker(2, transform.clone(), &reporter).run(&patterns).unwrap();

    assert_eq!(outcome.processed(), 0);
    assert!(transform.calls().is_empty());
    assert!(reporter.reports().is_empty());
}

#[test]
fn test_invalid_pattern_aborts_before_processing() {
    let temp_dir = create_temp_directory();
    let a = create_file(temp_dir.path(), "a.jpg", 10);
    let transform = Arc::new(FakeTransform::new());
    let reporter = RecordingReporter::new();

    let result = shrinker(2, transform.clone(), &reporter).run(&[path_string(&a), "[".to_string()]);

    assert!(matches!(result, Err(ShrinkError::InvalidPattern { .. })));
    assert!(transform.calls().is_empty());
    assert!(reporter.reports().is_empty());
}

#[test]
fn test_one_failure_among_five() {
    let temp_dir = create_temp_directory();
    let files: Vec<PathBuf> = (1..=5)
        .map(|i| create_file(temp_dir.path(), &format!("img{}.jpg", i), 1000 * i))
        .collect();
    let broken = files[2].clone();

    let mut transform = FakeTransform::new().fail_on(&broken);
    for file in &files {
        transform = transform.shrink_to(file, 100);
    }
    let transform = Arc::new(transform);
    let reporter = RecordingReporter::new();

    let outcome = shrinker(2, transform.clone(), &reporter)
        .run(&[path_string(&temp_dir.path().join("*.jpg"))])
        .unwrap();

    assert_eq!(transform.calls().len(), 5);
    assert_eq!(outcome.successes.len(), 4);
    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(outcome.failures[0].path(), broken.as_path());
    assert!(outcome.failures[0].to_string().contains("img3.jpg"));

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].results.len(), 4);
    assert!(reports[0].results.iter().all(|r| r.path() != broken.as_path()));
    assert_eq!(
        reports[0].totals,
        Totals {
            original_size: 1000 + 2000 + 4000 + 5000,
            new_size: 400
        }
    );
}

#[test]
fn test_every_file_failing_is_not_a_batch_failure() {
    let temp_dir = create_temp_directory();
    let a = create_file(temp_dir.path(), "a.jpg", 10);
    let b = create_file(temp_dir.path(), "b.jpg", 10);
    let transform = Arc::new(FakeTransform::new().fail_on(&a).fail_on(&b));
    let reporter = RecordingReporter::new();

    let outcome = shrinker(2, transform, &reporter)
        .run(&[path_string(&a), path_string(&b)])
        .unwrap();

    assert_eq!(outcome.failure_count(), 2);
    assert!(outcome.successes.is_empty());
    assert!(reporter.reports().is_empty());
}

#[test]
fn test_report_sorted_despite_completion_order() {
    let temp_dir = create_temp_directory();
    let a = create_file(temp_dir.path(), "a.jpg", 300);
    let b = create_file(temp_dir.path(), "b.jpg", 300);
    let c = create_file(temp_dir.path(), "c.jpg", 300);

    // c finishes first, a last
    let transform = Arc::new(
        FakeTransform::new()
            .delay(&a, Duration::from_millis(60))
            .delay(&b, Duration::from_millis(30))
            .shrink_to(&a, 100)
            .shrink_to(&b, 100)
            .shrink_to(&c, 100),
    );
    let reporter = RecordingReporter::new();

    shrinker(3, transform.clone(), &reporter)
        .run(&[path_string(&c), path_string(&b), path_string(&a)])
        .unwrap();

    assert_eq!(transform.calls().len(), 3);
    let reported: Vec<PathBuf> = reporter.reports()[0]
        .results
        .iter()
        .map(|r| r.path().to_path_buf())
        .collect();
    assert_eq!(reported, vec![a, b, c]);
}

#[test]
fn test_concurrency_bound_holds() {
    let temp_dir = create_temp_directory();
    for i in 0..12 {
        create_file(temp_dir.path(), &format!("{:02}.jpg", i), 10);
    }
    let transform = Arc::new(FakeTransform::new().default_delay(Duration::from_millis(10)));
    let reporter = RecordingReporter::new();

    let outcome = shrinker(3, transform.clone(), &reporter)
        .run(&[path_string(&temp_dir.path().join("*.jpg"))])
        .unwrap();

    assert_eq!(outcome.processed(), 12);
    assert!(transform.peak() <= 3, "peak was {}", transform.peak());
}

#[test]
fn test_concurrency_of_one_is_sequential() {
    let temp_dir = create_temp_directory();
    for i in 0..5 {
        create_file(temp_dir.path(), &format!("{}.png", i), 10);
    }
    let transform = Arc::new(FakeTransform::new().default_delay(Duration::from_millis(5)));
    let reporter = RecordingReporter::new();

    shrinker(1, transform.clone(), &reporter)
        .run(&[path_string(&temp_dir.path().join("*.png"))])
        .unwrap();

    assert_eq!(transform.peak(), 1);
    assert_eq!(transform.calls().len(), 5);
}

#[test]
fn test_overlapping_patterns_process_each_file_once() {
    let temp_dir = create_temp_directory();
    let a = create_file(temp_dir.path(), "a.jpg", 50);
    let transform = Arc::new(FakeTransform::new().shrink_to(&a, 25));
    let reporter = RecordingReporter::new();

    let outcome = shrinker(2, transform.clone(), &reporter)
        .run(&[path_string(&a), path_string(&temp_dir.path().join("*.jpg"))])
        .unwrap();

    assert_eq!(transform.calls(), vec![a]);
    assert_eq!(outcome.successes.len(), 1);
}

#[test]
fn test_zero_concurrency_rejected() {
    assert!(matches!(
        BatchOptions::new(0),
        Err(ShrinkError::InvalidConcurrency(0))
    ));
}
