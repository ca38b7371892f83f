use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dom::{DomService, HighlightSynchronizer};

/// A page with `rows` list items, each holding a link and an inline script
fn synthetic_page(rows: usize) -> String {
    let mut page = String::from("<!DOCTYPE html><html><head><title>bench</title></head><body><ul>");
    for i in 0..rows {
        page.push_str(&format!(
            r#"<li class="row" style="color: red"><a href="/item/{i}">Item number {i} with a longer label</a><script>var x = {i};</script></li>"#
        ));
    }
    page.push_str("</ul></body></html>");
    page
}

fn bench_inspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspect");
    for rows in [100usize, 1_000, 10_000] {
        let page = synthetic_page(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &page, |b, page| {
            let mut service = DomService::new();
            b.iter(|| service.inspect(black_box(page)).map(|i| i.augmented_markup.len()));
        });
    }
    group.finish();
}

fn bench_hover_sweep(c: &mut Criterion) {
    let page = synthetic_page(1_000);
    let inspection = match DomService::new().inspect(&page) {
        Ok(inspection) => inspection,
        Err(e) => panic!("bench page failed to parse: {e}"),
    };
    let ids: Vec<String> = inspection.tree.ids().into_iter().map(str::to_string).collect();

    c.bench_function("hover_sweep_1000", |b| {
        b.iter(|| {
            let mut sync = HighlightSynchronizer::new();
            let mut total = 0;
            for id in &ids {
                total += sync.set_hovered(&inspection.document, Some(id.as_str())).len();
            }
            black_box(total)
        });
    });
}

criterion_group!(benches, bench_inspect, bench_hover_sweep);
criterion_main!(benches);
