use criterion::{black_box, criterion_group, criterion_main, Criterion};
use link_preview_card::{
    render, HtmlRenderer, PreviewMetadata, PreviewState, Render, OG_DESCRIPTION, OG_IMAGE,
    OG_TITLE,
};

const TARGET: &str = "https://www.rust-lang.org/learn";

fn create_mock_state() -> PreviewState {
    let metadata: PreviewMetadata = [
        (OG_TITLE, "Learn Rust"),
        (
            OG_DESCRIPTION,
            "A language empowering everyone to build reliable and efficient software.",
        ),
        (OG_IMAGE, "https://www.rust-lang.org/static/images/rust-social.jpg"),
    ]
    .into_iter()
    .collect();
    PreviewState::Ready(metadata)
}

fn bench_render(c: &mut Criterion) {
    let state = create_mock_state();
    let html = HtmlRenderer::default();
    let mut group = c.benchmark_group("render");

    group.bench_function("card", |b| {
        b.iter(|| render(black_box(&state), black_box(TARGET)))
    });

    group.bench_function("html", |b| {
        b.iter(|| html.render(black_box(&state), black_box(TARGET)))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let body = r#"{"status":200,"data":{"og:title":"Learn Rust","og:description":"Reliable and efficient software.","og:image":"https://www.rust-lang.org/static/images/rust-social.jpg","og:type":"website","og:url":"https://www.rust-lang.org/learn"}}"#;

    c.bench_function("decode_response", |b| {
        b.iter(|| PreviewMetadata::from_response_body(black_box(body)))
    });
}

criterion_group!(benches, bench_render, bench_decode);
criterion_main!(benches);
