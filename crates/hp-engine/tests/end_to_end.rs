use std::sync::Arc;

use hp_engine::{Pipeline, SleepWork};
use hp_optimizer::{extract_scores, TARGET_METRIC};
use hp_types::{FinalMetrics, GreetingStyle, MetricsRecord, PipelineParams};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test(start_paused = true)]
async fn single_batch_uppercase_run() {
    let dir = tempfile::tempdir().unwrap();
    let params = PipelineParams::new()
        .with_greeting_style(GreetingStyle::Uppercase)
        .with_batch_size(6)
        .with_repeat_count(1)
        .with_delay(0.1)
        .with_outdir(dir.path());

    let report = Pipeline::new(params)
        .with_work(Arc::new(SleepWork))
        .run()
        .await
        .unwrap();

    assert_eq!(report.batches.len(), 1);
    let batch = &report.batches[0];
    assert_eq!(batch.metrics.greetings_processed, 6);
    assert_eq!(
        batch.lines,
        vec![
            "BONJOUR world!",
            "CIAO world!",
            "HELLO world!",
            "HOLA world!",
            "NAMASTE world!",
            "SALAAM world!",
        ]
    );

    let m = &batch.metrics;
    assert!(m.elapsed_seconds >= 0.6 && m.elapsed_seconds < 0.61);
    assert!(close(m.efficiency_score, 6.0 / (m.elapsed_seconds * 0.1)));
    assert_eq!(report.final_metrics.target_metric, m.efficiency_score);
    assert_eq!(report.final_metrics.average_efficiency_score, m.efficiency_score);

    // Files on disk match what the run reported.
    let greetings = std::fs::read_to_string(dir.path().join("batch_0_greetings.txt")).unwrap();
    assert_eq!(greetings.lines().count(), 6);
    assert_eq!(greetings.lines().next(), Some("BONJOUR world!"));

    let on_disk: MetricsRecord = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("batch_0_metrics.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(&on_disk, m);

    let final_on_disk: FinalMetrics = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("final_metrics.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(final_on_disk, report.final_metrics);

    let scores = extract_scores(&report.final_metrics_path);
    assert_eq!(scores[TARGET_METRIC], report.final_metrics.target_metric);
}

#[tokio::test(start_paused = true)]
async fn three_even_batches() {
    let dir = tempfile::tempdir().unwrap();
    let repeat_count = 3;
    let params = PipelineParams::new()
        .with_batch_size(2)
        .with_repeat_count(repeat_count)
        .with_delay(0.1)
        .with_outdir(dir.path());

    let report = Pipeline::new(params).run().await.unwrap();

    let sizes: Vec<usize> = report
        .batches
        .iter()
        .map(|b| b.metrics.greetings_processed / repeat_count)
        .collect();
    assert_eq!(sizes, vec![2, 2, 2]);
    assert_eq!(report.final_metrics.total_greetings_processed, 6 * repeat_count);

    for batch in &report.batches {
        assert_eq!(batch.lines.len(), batch.metrics.greetings_processed);
        assert!(dir.path().join(format!("batch_{}_metrics.json", batch.index)).exists());
    }

    let mean = report
        .batches
        .iter()
        .map(|b| b.metrics.efficiency_score)
        .sum::<f64>()
        / 3.0;
    assert!(close(report.final_metrics.target_metric, mean));
}

#[tokio::test(start_paused = true)]
async fn uneven_batches_use_unweighted_mean() {
    let dir = tempfile::tempdir().unwrap();
    let params = PipelineParams::new()
        .with_batch_size(4)
        .with_delay(0.2)
        .with_outdir(dir.path());

    let report = Pipeline::new(params).run().await.unwrap();
    assert_eq!(report.batches.len(), 2);
    assert_eq!(report.batches[0].lines.len(), 4);
    assert_eq!(report.batches[1].lines.len(), 2);

    let scores: Vec<f64> = report
        .batches
        .iter()
        .map(|b| b.metrics.efficiency_score)
        .collect();
    let mean_score = (scores[0] + scores[1]) / 2.0;
    assert!(close(report.final_metrics.average_efficiency_score, mean_score));

    let throughputs: Vec<f64> = report.batches.iter().map(|b| b.metrics.throughput).collect();
    let mean_throughput = (throughputs[0] + throughputs[1]) / 2.0;
    assert!(close(report.final_metrics.average_throughput, mean_throughput));
}

#[tokio::test(start_paused = true)]
async fn zero_delay_run_has_finite_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let params = PipelineParams::new()
        .with_delay(0.0)
        .with_outdir(dir.path());

    let report = Pipeline::new(params).run().await.unwrap();
    assert_eq!(report.final_metrics.total_greetings_processed, 6);
    assert_eq!(report.final_metrics.target_metric, 0.0);
    assert!(report.final_metrics.average_throughput.is_finite());
}
