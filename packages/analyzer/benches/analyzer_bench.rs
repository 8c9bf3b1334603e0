use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_analyzer::analyze;

fn analyze_hero(c: &mut Criterion) {
    let source = r#"<div class="hero"><h2>Title</h2><img src="x.jpg" alt="y"></div>"#;

    c.bench_function("analyze_hero", |b| b.iter(|| analyze(black_box(source))));
}

fn analyze_product_description(c: &mut Criterion) {
    let mut source = String::from(r#"<section class="description"><h1>Product</h1>"#);
    for i in 0..50 {
        source.push_str(&format!(
            r#"<div class="row feature"><div class="col"><img src="img/{i}.jpg" alt="Feature {i}"></div><div class="col"><h3>Feature {i}</h3><p>Some <strong>bold</strong> copy &amp; a <a href="/f/{i}">link</a>.</p></div></div>"#
        ));
    }
    source.push_str(r#"<ul><li>One</li><li>Two</li><li>Three</li></ul></section>"#);

    c.bench_function("analyze_product_description", |b| {
        b.iter(|| analyze(black_box(&source)))
    });
}

criterion_group!(benches, analyze_hero, analyze_product_description);
criterion_main!(benches);
