use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use param_miner::{
    extract, rewrite, FetchError, Fetcher, LineSink, ParameterMap, Pipeline, PipelineOptions, Sinks,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn sample_page(forms: usize) -> String {
    let mut page = String::from("<html><body>");
    for i in 0..forms {
        page.push_str(&format!(
            r#"<form action="/submit?step={i}&token="><input name="field{i}" value="v{i}"><select name="choice{i}"></select></form><a href="/item?id={i}&sort=asc">item</a>"#
        ));
    }
    page.push_str("</body></html>");
    page
}

fn benchmark_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    configure_fast_group(&mut group);

    let small = sample_page(5);
    let large = sample_page(500);

    group.bench_function("small_page", |b| {
        b.iter(|| black_box(extract(black_box(&small))));
    });

    group.bench_function("large_page", |b| {
        b.iter(|| black_box(extract(black_box(&large))));
    });

    group.finish();
}

fn benchmark_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    configure_fast_group(&mut group);

    let params: ParameterMap = (0..50)
        .map(|i| (format!("param{i}"), format!("value {i}/&")))
        .collect();

    group.bench_function("absolute_url", |b| {
        b.iter(|| black_box(rewrite("https://example.com/search?old=1#top", &params)));
    });

    group.bench_function("relative_url", |b| {
        b.iter(|| black_box(rewrite("/search?old=1", &params)));
    });

    group.finish();
}

struct StaticPage(Vec<u8>);

#[async_trait]
impl Fetcher for StaticPage {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.0.clone())
    }
}

fn benchmark_pipeline(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("pipeline");
    configure_fast_group(&mut group);

    let input: String = (0..200).map(|i| format!("https://example.com/{i}\n")).collect();
    let fetcher: Arc<dyn Fetcher> = Arc::new(StaticPage(sample_page(10).into_bytes()));

    group.bench_function("200_urls_10_workers", |b| {
        b.iter(|| {
            rt.block_on(async {
                let sinks = Sinks {
                    output: LineSink::new(tokio::io::sink()),
                    errors: LineSink::new(tokio::io::sink()),
                    console: LineSink::new(tokio::io::sink()),
                };
                let pipeline = Pipeline::new(fetcher.clone(), PipelineOptions::default(), sinks);
                let summary = pipeline.run(input.as_bytes()).await.unwrap();
                black_box(summary);
            })
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_extraction, benchmark_rewrite, benchmark_pipeline);
criterion_main!(benches);
