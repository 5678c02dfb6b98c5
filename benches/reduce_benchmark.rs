//! Performance benchmarks for the payload-to-state pipeline
//!
//! Measures frame parsing, reduction of long token streams and projection
//! of large transcripts.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ragchat::models::TranscriptEntry;
use ragchat::sse::parse_payload;
use ragchat::state::{reduce, JobSessionState, SessionEvent};
use ragchat::view::{project, AppMetadata};

/// A realistic job stream: status updates, progress, prompt, `chunks`
/// answer tokens and a terminal frame.
fn generate_payloads(chunks: usize) -> Vec<String> {
    let mut payloads = vec![
        r#"data:{"statusMessage":"Retrieving documents"}"#.to_string(),
        r#"data:{"progress":25}"#.to_string(),
        r#"data:{"prompt":"Use the following context to answer the question."}"#.to_string(),
        r#"data:{"statusMessage":"Generating answer","progress":50}"#.to_string(),
    ];
    payloads.extend((0..chunks).map(|i| format!("data:token{} ", i)));
    payloads.push(r#"data:{"status":"COMPLETED"}"#.to_string());
    payloads
}

fn run_stream(payloads: &[String]) -> JobSessionState {
    let mut state = JobSessionState::new("bench", vec![TranscriptEntry::user("question")]);
    for payload in payloads {
        for frame in parse_payload(payload) {
            state = reduce(state, SessionEvent::Frame(frame)).0;
        }
    }
    state
}

/// Benchmark parsing of individual payload shapes
fn bench_parse_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_payload");

    let cases = [
        ("raw_chunk", "data:The answer is 42."),
        ("status", r#"data:{"statusMessage":"Retrieving documents"}"#),
        (
            "combined",
            r#"data:{"statusMessage":"done","progress":100,"response":{"answer":"42","prompt":"p"},"complete":true}"#,
        ),
        ("malformed", r#"data:{"statusMessage": }"#),
    ];
    for (name, payload) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), payload, |b, payload| {
            b.iter(|| parse_payload(black_box(payload)));
        });
    }

    group.finish();
}

/// Benchmark a whole stream through parser and reducer
fn bench_reduce_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_stream");

    for chunks in [10, 100, 1000].iter() {
        let payloads = generate_payloads(*chunks);
        group.throughput(Throughput::Elements(payloads.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chunks), &payloads, |b, payloads| {
            b.iter(|| run_stream(black_box(payloads)));
        });
    }

    group.finish();
}

/// Benchmark projection of long conversations
fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    let meta = AppMetadata::default();

    for turns in [10, 100, 500].iter() {
        let history: Vec<TranscriptEntry> = (0..*turns)
            .flat_map(|i| {
                [
                    TranscriptEntry::user(format!("question {}", i)),
                    TranscriptEntry::assistant(format!("answer {}", i)),
                ]
            })
            .collect();
        let state = JobSessionState::new("bench", history);
        group.bench_with_input(BenchmarkId::from_parameter(turns), &state, |b, state| {
            b.iter(|| project(black_box(state), &meta));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_payload, bench_reduce_stream, bench_project);
criterion_main!(benches);
