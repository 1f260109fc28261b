use std::hint::black_box;

use bencher::{REGISTRATIONS, header_cases};
use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use http_body_util::Full;
use micro_input::{Input, MediaParams, MediaType, ParamCase, ParseOutcome, fn_parser};

type BenchBody = Full<Bytes>;

fn build_input() -> Input<BenchBody, usize> {
    REGISTRATIONS
        .iter()
        .enumerate()
        .fold(Input::<BenchBody, usize>::builder(), |builder, (i, media_type)| {
            builder.parser(*media_type, fn_parser(move |_body: BenchBody, _params: &MediaParams| Ok(ParseOutcome::value(i))))
        })
        .build()
        .expect("registrations should be valid")
}

fn benchmark_parse_header(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("parse_header");

    for case in header_cases() {
        group.throughput(Throughput::Bytes(case.header().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| {
                let media_type = MediaType::parse_header(black_box(case.header().as_bytes()), ParamCase::Fold)
                    .expect("header should be valid");
                black_box(media_type);
            });
        });
    }

    group.finish();
}

fn benchmark_select(criterion: &mut Criterion) {
    let input = build_input();
    let mut group = criterion.benchmark_group("select");

    for case in header_cases() {
        let media_type = MediaType::parse_header(case.header().as_bytes(), ParamCase::Fold).expect("header should be valid");
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &media_type, |b, media_type| {
            b.iter(|| black_box(input.select(black_box(media_type)).is_ok()));
        });
    }

    group.finish();
}

criterion_group!(media_type, benchmark_parse_header, benchmark_select);
criterion_main!(media_type);
