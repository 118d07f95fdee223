use std::hint::black_box;

use bencher::{TestCase, TestRequest};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use ext_plugin_http::codec::DeltaEncoder;
use ext_plugin_http::protocol::Request;
use ext_plugin_http::wire::ReqBuilder;

static SMALL_HEADERS: TestRequest =
    TestRequest::new("/index.html", &[("Host", "127.0.0.1:8080"), ("User-Agent", "curl/7.79.1"), ("Accept", "*/*")]);

static LARGE_HEADERS: TestRequest = TestRequest::new(
    "/api/v1/orders/2024/items?page=3&size=50",
    &[
        ("Host", "shop.example.com"),
        ("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)"),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Accept-Language", "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7"),
        ("Cache-Control", "no-cache"),
        ("Connection", "keep-alive"),
        ("Cookie", "session=6f1ce4a1b2d94c0e8a3f; theme=dark; locale=en_US; tracking=disabled"),
        ("Pragma", "no-cache"),
        ("Referer", "https://shop.example.com/api/v1/orders/2024"),
        ("X-Request-Id", "0b8d7c1e-5f6a-4e2b-9c3d-7a1f2e4b6c8d"),
        ("X-Forwarded-For", "203.0.113.7, 198.51.100.23"),
        ("X-Forwarded-Proto", "https"),
        ("X-Real-Ip", "203.0.113.7"),
        ("X-Trace", "abc"),
        ("X-Debug", "1"),
    ],
);

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::normal("small_headers", SMALL_HEADERS), TestCase::normal("large_headers", LARGE_HEADERS)]
}

fn build_request(request: &TestRequest) -> Vec<u8> {
    request.headers().iter().fold(ReqBuilder::new(1, request.path()), |builder, &(name, value)| builder.header(name, value)).build()
}

fn benchmark_decode(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("decode");

    for case in create_test_cases() {
        let buf = build_request(case.request());
        group.throughput(Throughput::Bytes(buf.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &buf, |b, buf| {
            b.iter(|| {
                let mut request = Request::decode(buf).expect("input should be a valid request");
                black_box(request.header().len());
            });
        });
    }

    group.finish();
}

fn benchmark_delta_encoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("delta_encoder");

    for case in create_test_cases() {
        let buf = build_request(case.request());
        group.throughput(Throughput::Bytes(buf.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &buf, |b, buf| {
            let mut encoder = DeltaEncoder::new();
            b.iter_batched_ref(
                || {
                    let mut request = Request::decode(buf).expect("input should be a valid request");
                    request.set_path("/rewritten");
                    request.header().set("X-Trace", "xyz").expect("header should be valid");
                    request.header().remove("x-debug");
                    request
                },
                |request| {
                    let delta = encoder.encode(request).expect("changes should be encodable");
                    black_box(delta.map(<[u8]>::len));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(delta, benchmark_decode, benchmark_delta_encoder);
criterion_main!(delta);
