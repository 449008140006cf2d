//! Concurrency and thread safety tests for quotefp

use std::sync::Arc;
use std::thread;

use quotefp::{CandidateHit, MappingTable, QuoteFinder, QuotefpConfig};

fn shared_finder() -> Arc<QuoteFinder> {
    let mut cfg = QuotefpConfig::default();
    cfg.perceptual.ngram_size = 8;
    cfg.perceptual.window_size = 5;
    Arc::new(
        QuoteFinder::with_mappings(cfg, MappingTable::parse("ye=the\nthou=you")).expect("finder"),
    )
}

const QUERY: &str = "Friends, Romans, countrymen, lend me your ears; \
                     I come to bury Caesar, not to praise him.";

fn hits() -> Vec<CandidateHit> {
    (0..24)
        .map(|i| {
            let text = match i % 4 {
                0 => format!("Document {i}: friends romans countrymen lend me your ears"),
                1 => format!("Document {i}: I come to bury Caesar not to praise him"),
                2 => format!("Document {i}: nothing quoted here whatsoever"),
                _ => format!("Document {i}. {QUERY}"),
            };
            CandidateHit::new(format!("doc-{i}"), text)
        })
        .collect()
}

#[test]
fn concurrent_fingerprinting_is_consistent() {
    let finder = shared_finder();
    let expected = finder.fingerprint(QUERY).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let finder = Arc::clone(&finder);
            thread::spawn(move || finder.fingerprint(QUERY).expect("fingerprint"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn parallel_batch_matches_sequential_compare() {
    let finder = shared_finder();
    let hits = hits();
    let batch = finder.compare_many(QUERY, &hits).unwrap();

    let query_fp = finder.fingerprint(QUERY).unwrap();
    assert_eq!(batch.hits.len(), hits.len());
    for (outcome, hit) in batch.hits.iter().zip(&hits) {
        assert_eq!(outcome.hit_id, hit.id);
        let sequential = finder.compare(QUERY, &query_fp, &hit.id, &hit.text);
        assert_eq!(outcome.result, sequential);
    }
}

#[test]
fn batches_from_many_threads_agree() {
    let finder = shared_finder();
    let hits = Arc::new(hits());
    let expected = finder.compare_many(QUERY, &hits).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let finder = Arc::clone(&finder);
            let hits = Arc::clone(&hits);
            thread::spawn(move || finder.compare_many(QUERY, &hits).expect("batch"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn cloned_finders_share_mappings() {
    let finder = shared_finder();
    let clone = (*finder).clone();
    let a = finder.fingerprint("ye art thou").unwrap();
    let b = clone.fingerprint("the art you").unwrap();
    assert_eq!(a.tokens().collect::<Vec<_>>(), b.tokens().collect::<Vec<_>>());
}
