use tempfile::TempDir;

use transmem::corpus::{Corpus, CorpusReader, MemoryCorpus, StringPair};
use transmem::{
    ContextVector, DataBatch, Deletion, Domain, LanguageIndex, LanguagePair, MemoryConfig, Result,
    ScoreEntry, Sentence, TmError, TranslationMemory, TranslationUnit,
};

fn en_it() -> LanguagePair {
    "en:it".parse().unwrap()
}

fn it_en() -> LanguagePair {
    "it:en".parse().unwrap()
}

fn setup_memory() -> (TempDir, TranslationMemory) {
    let tmp = TempDir::new().unwrap();
    let config = MemoryConfig::persistent(tmp.path()).with_sync_on_commit(false);
    let tm = TranslationMemory::open(config, LanguageIndex::new([en_it(), it_en()])).unwrap();
    (tmp, tm)
}

fn unit(channel: u16, position: u64, domain: u64, direction: LanguagePair, source: &str, target: &str) -> TranslationUnit {
    TranslationUnit::new(
        channel,
        position,
        domain,
        direction,
        Sentence::from_text(source),
        Sentence::from_text(target),
    )
}

fn search(tm: &TranslationMemory, direction: &LanguagePair, text: &str, limit: usize) -> Vec<ScoreEntry> {
    tm.search(direction, &Sentence::from_text(text), None, limit).unwrap()
}

fn targets(entries: &[ScoreEntry]) -> Vec<String> {
    entries.iter().map(|e| e.target.to_string()).collect()
}

/// Yields its pairs, then fails on the read at `fail_at`
struct FailingCorpus {
    pairs: Vec<StringPair>,
    fail_at: usize,
}

struct FailingReader<'a> {
    corpus: &'a FailingCorpus,
    next: usize,
}

impl Corpus for FailingCorpus {
    fn name(&self) -> &str {
        "failing"
    }

    fn reader(&self) -> Result<Box<dyn CorpusReader + '_>> {
        Ok(Box::new(FailingReader { corpus: self, next: 0 }))
    }
}

impl CorpusReader for FailingReader<'_> {
    fn read(&mut self) -> Result<Option<StringPair>> {
        if self.next == self.corpus.fail_at {
            return Err(TmError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk read failed",
            )));
        }
        let pair = self.corpus.pairs.get(self.next).cloned();
        self.next += 1;
        Ok(pair)
    }
}

#[test]
fn end_to_end_stream_unit_is_top_result() {
    let (_tmp, tm) = setup_memory();
    let batch = DataBatch::new().with_unit(unit(1, 1, 1, en_it(), "Hello", "Ciao"));

    tm.on_data_received(&batch).unwrap();

    let results = search(&tm, &en_it(), "Hello", 5);
    assert_eq!(results[0].target.to_string(), "Ciao");
    assert_eq!(results[0].domain, 1);
}

#[test]
fn replayed_batch_changes_store_once() {
    let (_tmp, tm) = setup_memory();
    let batch = DataBatch::new()
        .with_unit(unit(1, 1, 1, en_it(), "good morning", "buongiorno"))
        .with_unit(unit(1, 2, 1, en_it(), "good night", "buonanotte"));

    assert_eq!(tm.on_data_received(&batch).unwrap(), 2);
    let generation = tm.generation();

    assert_eq!(tm.on_data_received(&batch).unwrap(), 0);
    assert_eq!(tm.generation(), generation);
    assert_eq!(tm.unit_count(), 2);
    assert_eq!(search(&tm, &en_it(), "good", 10).len(), 2);
}

#[test]
fn out_of_order_positions_apply_once() {
    let (_tmp, tm) = setup_memory();

    let mut applied = Vec::new();
    for (position, text) in [(5, "five"), (3, "three"), (7, "seven")] {
        let batch = DataBatch::new().with_unit(unit(1, position, 1, en_it(), text, text));
        if tm.on_data_received(&batch).unwrap() > 0 {
            applied.push(position);
        }
    }

    assert_eq!(applied, vec![5, 7]);
    assert_eq!(tm.latest_positions().get(&1), Some(&7));
    assert!(search(&tm, &en_it(), "three", 5).is_empty());
}

#[test]
fn repeated_deletion_is_a_no_op() {
    let (_tmp, tm) = setup_memory();
    let batch = DataBatch::new()
        .with_unit(unit(1, 1, 3, en_it(), "delete me", "cancellami"))
        .with_unit(unit(1, 2, 4, en_it(), "keep me", "tienimi"));
    tm.on_data_received(&batch).unwrap();

    let deletion = Deletion::new(1, 3, 3);
    assert!(tm.on_delete(&deletion).unwrap());
    let generation = tm.generation();

    // Content re-added to the domain after the deletion survives a replay
    tm.on_data_received(&DataBatch::new().with_unit(unit(1, 4, 3, en_it(), "me again", "ancora io")))
        .unwrap();
    assert!(!tm.on_delete(&deletion).unwrap());

    assert_eq!(tm.generation(), generation + 1);
    assert!(search(&tm, &en_it(), "delete", 5).is_empty());
    assert_eq!(targets(&search(&tm, &en_it(), "me", 5)).len(), 2);
}

#[test]
fn search_never_crosses_direction() {
    let (_tmp, tm) = setup_memory();
    let batch = DataBatch::new()
        .with_unit(unit(1, 1, 1, en_it(), "ciao amico", "hi friend"))
        .with_unit(unit(1, 2, 1, it_en(), "ciao amico", "hello friend"));
    tm.on_data_received(&batch).unwrap();

    let forward = search(&tm, &en_it(), "ciao amico", 10);
    let backward = search(&tm, &it_en(), "ciao amico", 10);

    assert_eq!(targets(&forward), vec!["hi friend"]);
    assert_eq!(targets(&backward), vec!["hello friend"]);
    assert!(forward.iter().all(|e| e.direction == en_it()));
}

#[test]
fn failed_import_leaves_nothing_visible() {
    let (_tmp, tm) = setup_memory();
    let pairs: Vec<StringPair> = ["one", "two", "three", "four", "five"]
        .iter()
        .map(|w| StringPair::new(en_it(), *w, *w))
        .collect();
    let corpus = FailingCorpus { pairs, fail_at: 2 };

    let err = tm.bulk_add(&Domain::new(1), &corpus).unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(tm.unit_count(), 0);
    for word in ["one", "two", "three", "four", "five"] {
        assert!(search(&tm, &en_it(), word, 5).is_empty());
    }
}

#[test]
fn identical_searches_are_deterministic() {
    let (_tmp, tm) = setup_memory();
    let corpus = MemoryCorpus::new(
        "tied",
        (0..20)
            .map(|i| StringPair::new(en_it(), "the same sentence", format!("traduzione {}", i).as_str()))
            .collect(),
    );
    tm.bulk_add(&Domain::new(1), &corpus).unwrap();

    let context = ContextVector::from_pairs(&[(1, 0.5)]);
    let first = tm.search(&en_it(), &Sentence::from_text("the same sentence"), Some(&context), 7).unwrap();
    let second = tm.search(&en_it(), &Sentence::from_text("the same sentence"), Some(&context), 7).unwrap();

    assert_eq!(first.len(), 7);
    assert_eq!(first, second);
}

#[test]
fn limit_bounds_results() {
    let (_tmp, tm) = setup_memory();
    let corpus = MemoryCorpus::new(
        "cats",
        vec![
            StringPair::new(en_it(), "black cat", "gatto nero"),
            StringPair::new(en_it(), "white cat", "gatto bianco"),
            StringPair::new(en_it(), "cat food", "cibo per gatti"),
            StringPair::new(en_it(), "dog food", "cibo per cani"),
        ],
    );
    tm.bulk_add(&Domain::new(1), &corpus).unwrap();

    assert!(search(&tm, &en_it(), "cat", 0).is_empty());
    assert_eq!(search(&tm, &en_it(), "cat", 1000).len(), 3);
    assert_eq!(search(&tm, &en_it(), "cat", 2).len(), 2);
    assert_eq!(search(&tm, &en_it(), "cat", usize::MAX).len(), 3);
    assert_eq!(search(&tm, &en_it(), "cat", usize::MAX / 4).len(), 3);
}

#[test]
fn unmatched_context_falls_back_to_similarity() {
    let (_tmp, tm) = setup_memory();
    let corpus = MemoryCorpus::new(
        "weather",
        vec![
            StringPair::new(en_it(), "it is raining today", "oggi piove"),
            StringPair::new(en_it(), "it is raining", "piove"),
        ],
    );
    tm.bulk_add(&Domain::new(1), &corpus).unwrap();

    let query = Sentence::from_text("it is raining");
    let context = ContextVector::from_pairs(&[(42, 1.0)]);
    let with_context = tm.search(&en_it(), &query, Some(&context), 5).unwrap();
    let without_context = tm.search(&en_it(), &query, None, 5).unwrap();

    assert_eq!(with_context, without_context);
    assert_eq!(with_context[0].target.to_string(), "piove");
}

#[test]
fn empty_query_returns_nothing() {
    let (_tmp, tm) = setup_memory();
    tm.add(&en_it(), &Domain::new(1), &Sentence::from_text("hello"), &Sentence::from_text("ciao"))
        .unwrap();

    assert!(search(&tm, &en_it(), "", 5).is_empty());
    assert!(search(&tm, &en_it(), "?!", 5).is_empty());
    assert!(search(&tm, &"fr:de".parse().unwrap(), "hello", 5).is_empty());
}
