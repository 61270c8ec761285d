use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use transmem::corpus::{MemoryCorpus, StringPair};
use transmem::{
    ContextVector, DataBatch, Domain, LanguageIndex, LanguagePair, MemoryConfig, Sentence,
    TranslationMemory, TranslationUnit,
};

const WORDS: &[&str] = &[
    "the", "contract", "shall", "be", "signed", "by", "both", "parties", "before", "delivery",
    "of", "goods", "payment", "is", "due", "within", "thirty", "days", "invoice", "date",
];

struct BenchEnv {
    _tmp: TempDir,
    tm: TranslationMemory,
}

fn en_it() -> LanguagePair {
    "en:it".parse().unwrap()
}

fn make_sentence(seed: usize, len: usize) -> String {
    (0..len)
        .map(|i| WORDS[(seed * 7 + i * 3) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_env(unit_count: usize) -> BenchEnv {
    let tmp = TempDir::new().unwrap();
    let config = MemoryConfig::persistent(tmp.path()).with_sync_on_commit(false);
    let tm = TranslationMemory::open(config, LanguageIndex::new([en_it()])).unwrap();

    let pairs = (0..unit_count)
        .map(|i| {
            let source = make_sentence(i, 8 + i % 6);
            StringPair::new(en_it(), source.as_str(), format!("traduzione {}", i).as_str())
        })
        .collect();
    let corpus = MemoryCorpus::new("bench", pairs);
    tm.bulk_add(&Domain::new((unit_count % 5 + 1) as u64), &corpus)
        .unwrap();

    BenchEnv { _tmp: tmp, tm }
}

fn bench_search(c: &mut Criterion) {
    let counts = [1_000usize, 5_000, 10_000];
    let envs: Vec<(usize, BenchEnv)> = counts.iter().map(|&n| (n, build_env(n))).collect();
    let query = Sentence::from_text(&make_sentence(3, 10));
    let context = ContextVector::from_pairs(&[(1, 0.7), (2, 0.3)]);

    let mut group = c.benchmark_group("search");
    for (count, env) in envs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                black_box(env.tm.search(&en_it(), &query, Some(&context), 10).unwrap());
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("search_raw_ranking");
    for (count, env) in envs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                black_box(env.tm.search_with(&en_it(), &query, None, None, 10).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    c.bench_function("on_data_received_100_units", |b| {
        let env = build_env(0);
        let mut position = 0u64;
        b.iter(|| {
            let mut batch = DataBatch::new();
            for i in 0..100 {
                position += 1;
                batch.push_unit(TranslationUnit::new(
                    1,
                    position,
                    1,
                    en_it(),
                    Sentence::from_text(&make_sentence(i, 10)),
                    Sentence::from_text("traduzione"),
                ));
            }
            black_box(env.tm.on_data_received(&batch).unwrap());
        });
    });
}

criterion_group!(benches, bench_search, bench_ingest);
criterion_main!(benches);
