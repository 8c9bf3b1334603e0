use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_analyzer::Analyzer;
use tessera_compiler_html::{compile, compile_with_options, CompileOptions};
use tessera_document::{Breakpoint, Element, ElementTree, ElementType, StyleState};

fn styled_tree(sections: usize) -> ElementTree {
    let mut root = Element::fragment("b-1");
    for i in 0..sections {
        let section = Element::new(format!("b-s{}", i), ElementType::Container, "section")
            .with_style(StyleState::Normal, Breakpoint::Desktop, "padding", "2rem")
            .with_style(StyleState::Normal, Breakpoint::Mobile, "padding", "1rem")
            .with_child(
                Element::new(format!("b-h{}", i), ElementType::Heading, "h2")
                    .with_content(format!("Section {}", i))
                    .with_style(StyleState::Normal, Breakpoint::Desktop, "font-size", "2rem")
                    .with_style(StyleState::Normal, Breakpoint::Tablet, "font-size", "1.5rem"),
            )
            .with_child(
                Element::new(format!("b-a{}", i), ElementType::Button, "a")
                    .with_content("Buy")
                    .with_attribute("href", "/buy")
                    .with_style(StyleState::Normal, Breakpoint::Desktop, "background-color", "#3366ff")
                    .with_style(StyleState::Hover, Breakpoint::Desktop, "background-color", "#2244cc"),
            );
        root = root.with_child(section);
    }
    ElementTree::new(root)
}

fn compile_styled(c: &mut Criterion) {
    let tree = styled_tree(50);
    c.bench_function("compile_styled_50", |b| b.iter(|| compile("b", black_box(&tree))));

    let options = CompileOptions {
        minify_css: true,
        ..CompileOptions::default()
    };
    c.bench_function("compile_styled_50_minified", |b| {
        b.iter(|| compile_with_options("b", black_box(&tree), &options))
    });
}

fn analyze_then_compile(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..50 {
        source.push_str(&format!(
            r#"<div class="row"><div class="col"><img src="img/{i}.jpg" alt=""></div><div class="col"><h3>Feature {i}</h3><p>Copy</p></div></div>"#
        ));
    }
    let analyzer = Analyzer::new().with_id_seed("b");

    c.bench_function("analyze_then_compile", |b| {
        b.iter(|| {
            if let Ok(report) = analyzer.analyze(black_box(&source)) {
                black_box(compile("b", &report.tree));
            }
        })
    });
}

criterion_group!(benches, compile_styled, analyze_then_compile);
criterion_main!(benches);
