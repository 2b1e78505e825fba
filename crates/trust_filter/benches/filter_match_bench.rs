//! Trust Filter Benchmarks
//!
//! Measures per-packet matching cost for each matcher kind and the cost of
//! compiling a policy from INFO text.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndn_trust_filter::{FilterCompiler, Name, NameMatcher, Packet, TrustFilter};

fn deep_name(depth: usize) -> Name {
    (0..depth).fold(Name::from_uri("/ndn/site").unwrap(), |name, i| {
        name.append(format!("c{}", i).as_str())
    })
}

fn bench_matchers(c: &mut Criterion) {
    let prefix = Name::from_uri("/ndn/site").unwrap();
    let filters = [
        ("exact", TrustFilter::new(NameMatcher::Exact(prefix.clone()))),
        ("prefix", TrustFilter::new(NameMatcher::Prefix(prefix.clone()))),
        ("strict_prefix", TrustFilter::new(NameMatcher::StrictPrefix(prefix))),
        (
            "regex",
            TrustFilter::new(NameMatcher::regex("^<ndn><site><>*<c3>[<c4><c5>]+$").unwrap()),
        ),
    ];

    let mut group = c.benchmark_group("filter_match");
    for depth in [4, 16, 64] {
        let name = deep_name(depth);
        for (label, filter) in &filters {
            group.bench_with_input(BenchmarkId::new(*label, depth), &name, |b, name| {
                b.iter(|| filter.matches(black_box(Packet::Interest(name))))
            });
        }
    }
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let policy = "filter\n{\n  type name\n  name /ndn/site\n  relation is-prefix-of\n}\n\
                  filter\n{\n  type name\n  regex ^<ndn><site><>*<KEY><>$\n}\n";

    c.bench_function("compile_policy", |b| {
        b.iter(|| FilterCompiler::compile_policy(black_box(policy)).unwrap())
    });
}

criterion_group!(benches, bench_matchers, bench_compile);
criterion_main!(benches);
