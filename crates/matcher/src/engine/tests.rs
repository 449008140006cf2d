use super::*;

use canonical::Normalizer;
use perceptual::{FingerprintMeta, PerceptualConfig};

fn reconstructor(n: usize, w: usize, grow: bool) -> Reconstructor {
    let winnower = Winnower::new(
        Normalizer::identity(),
        PerceptualConfig::new().with_ngram_size(n).with_window_size(w),
    )
    .unwrap();
    Reconstructor::new(winnower, MatchConfig::new().with_grow(grow)).unwrap()
}

fn run(r: &Reconstructor, query: &str, hit: &str) -> Overlaps {
    let query_fp = r.winnower().fingerprint(query).unwrap();
    r.reconstruct(query, &query_fp, hit).unwrap()
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn entry(ngram: &str, token: &str, hash: u32, start: usize) -> FingerprintEntry {
    FingerprintEntry {
        ngram: ngram.to_string(),
        token: token.to_string(),
        hash,
        start,
        end: start + ngram.chars().count() - 1,
        ngram_index: start,
    }
}

fn set(entries: Vec<FingerprintEntry>) -> FingerprintSet {
    FingerprintSet {
        entries,
        meta: FingerprintMeta {
            perceptual_version: perceptual::PERCEPTUAL_VERSION,
            algorithm_name: perceptual::PERCEPTUAL_ALGORITHM.to_string(),
            ngram_size: 4,
            window_size: 3,
            config_version: 1,
        },
        normalized: None,
    }
}

fn covered(ranges: &[Range], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(offset))
}

// ==================== End-to-end reconstruction ====================

#[test]
fn shared_prefix_is_reconstructed_exactly() {
    let r = reconstructor(4, 3, true);
    let out = run(&r, "the quick brown fox jumps", "the quick brown fox leaps");
    assert_eq!(out.query, vec![Range::new(0, 18)]);
    assert_eq!(out.hit, vec![Range::new(0, 18)]);
}

#[test]
fn self_match_covers_whole_text() {
    let r = reconstructor(4, 3, true);
    let text = "It was the best of times, it was the worst of times.";
    let out = run(&r, text, text);
    let last_letter = text.chars().count() - 2;
    assert_eq!(out.query, vec![Range::new(0, last_letter)]);
    assert_eq!(out.hit, vec![Range::new(0, last_letter)]);
}

#[test]
fn markup_break_still_covers_every_letter() {
    let r = reconstructor(4, 3, true);
    let plain = "to be or not to be that is the question";
    let marked = "to be or not<br>to be that is the question";
    let out = run(&r, plain, marked);

    for (i, c) in plain.chars().enumerate() {
        if c.is_ascii_alphabetic() {
            assert!(covered(&out.query, i), "query offset {i} not covered");
        }
    }
    let hit: Vec<char> = chars(marked);
    for (i, c) in hit.iter().enumerate() {
        let in_markup = (12..16).contains(&i);
        if c.is_ascii_alphabetic() && !in_markup {
            assert!(covered(&out.hit, i), "hit offset {i} not covered");
        }
    }
}

#[test]
fn unrelated_texts_do_not_overlap() {
    let r = reconstructor(4, 3, true);
    let out = run(&r, "completely different words here", "nothing alike in this sentence");
    assert!(out.is_empty());
}

#[test]
fn short_query_has_no_overlaps() {
    let r = reconstructor(20, 10, true);
    let out = run(&r, "tiny", "tiny but much longer hit text goes here");
    assert!(out.is_empty());
}

#[test]
fn disabled_growth_keeps_ranges_inside_seeds() {
    let r = reconstructor(4, 3, false);
    let out = run(&r, "the quick brown fox jumps", "the quick brown fox leaps");
    assert!(!out.query.is_empty());
    assert!(out.query.iter().all(|x| x.end <= 18));
    assert!(out.hit.iter().all(|x| x.end <= 18));
}

#[test]
fn merged_output_is_strictly_ascending() {
    let r = reconstructor(4, 3, true);
    let query = "Alpha beta gamma. Delta epsilon zeta! Eta theta iota kappa lambda mu.";
    let hit = "Eta theta iota kappa. Alpha beta gamma, and then delta epsilon zeta.";
    let out = run(&r, query, hit);
    assert!(!out.query.is_empty());
    assert!(out.query.windows(2).all(|w| w[0].end < w[1].start));
    assert!(out.hit.windows(2).all(|w| w[0].end < w[1].start));
    let qlen = query.chars().count();
    let hlen = hit.chars().count();
    assert!(out.query.iter().all(|x| x.start <= x.end && x.end < qlen));
    assert!(out.hit.iter().all(|x| x.start <= x.end && x.end < hlen));
}

// ==================== Seeding ====================

#[test]
fn token_collision_is_fatal() {
    let query_fp = set(vec![entry("ab c", "ab0c", 7, 0)]);
    let hit_fp = set(vec![entry("ab0c", "ab0c", 9, 0)]);
    let err = seed_matches(&query_fp, &hit_fp).unwrap_err();
    assert_eq!(
        err,
        MatchError::FingerprintMismatch {
            query: "ab c".into(),
            hit: "ab0c".into()
        }
    );

    let r = reconstructor(4, 3, true);
    let err = r
        .reconstruct_with("ab cd", &query_fp, "ab0cd", &hit_fp)
        .unwrap_err();
    assert!(matches!(err, MatchError::FingerprintMismatch { .. }));
}

#[test]
fn seeds_use_first_hit_entry_per_token() {
    let query_fp = set(vec![entry("abcd", "abcd", 1, 10)]);
    let hit_fp = set(vec![entry("abcd", "abcd", 1, 3), entry("abcd", "abcd", 1, 40)]);
    let seeds = seed_matches(&query_fp, &hit_fp).unwrap();
    assert_eq!(seeds, vec![Candidate::new(10, 13, 3, 6)]);
}

// ==================== Word gaps ====================

#[test]
fn gap_words_are_matched_in_both_texts() {
    let query = chars("alpha beta gamma delta");
    let hit = chars("alpha gamma beta delta");
    let seeds = vec![Candidate::new(0, 4, 0, 4), Candidate::new(17, 21, 17, 21)];
    let extra = word_matches(&query, &hit, &seeds, 100);
    assert_eq!(
        extra,
        vec![Candidate::new(11, 15, 6, 10), Candidate::new(6, 9, 12, 15)]
    );
}

#[test]
fn misaligned_pairs_are_skipped() {
    let query = chars("alpha beta gamma delta");
    let hit = chars("delta beta gamma alpha");
    // Second seed starts before the first ends in the hit.
    let seeds = vec![Candidate::new(0, 4, 17, 21), Candidate::new(17, 21, 0, 4)];
    let extra = word_matches(&query, &hit, &seeds, 100);
    assert!(extra.iter().all(|c| c.query_start != 6));
}

#[test]
fn far_pairs_probe_near_each_end_only() {
    let filler = "x".repeat(300);
    let query = chars(&format!("start one two {filler} three four end"));
    let hit = chars(&format!("start two one {filler} four three end"));
    let qlen = query.len() as isize;
    let hlen = hit.len() as isize;
    let seeds = vec![
        Candidate::new(0, 4, 0, 4),
        Candidate::new(qlen - 3, qlen - 1, hlen - 3, hlen - 1),
    ];
    let extra = word_matches(&query, &hit, &seeds, 100);
    let mut found: Vec<(isize, isize)> = extra.iter().map(|c| (c.query_start, c.hit_start)).collect();
    found.sort();
    // "one"/"two" near the first seed, "three"/"four" near the last.
    assert_eq!(found.len(), 4);
    assert!(found.contains(&(6, 10)));
    assert!(found.contains(&(10, 6)));
}

#[test]
fn no_seeds_no_words() {
    let query = chars("alpha beta");
    assert!(word_matches(&query, &query, &[], 100).is_empty());
}

// ==================== Growth ====================

#[test]
fn invalid_candidates_are_dropped() {
    let text = chars("abcdefghij");
    let grown = grow_matches(
        vec![
            Candidate::new(-1, 3, 0, 3),
            Candidate::new(2, 4, 2, 4),
            Candidate::new(6, 5, 6, 7),
        ],
        &text,
        &text,
        false,
    );
    assert_eq!(grown, vec![Candidate::new(2, 4, 2, 4)]);
}

#[test]
fn crossing_neighbor_is_pulled_back() {
    let query = chars("abcdefghijklmnopqrst");
    let hit = chars("fghijklmnopqrstuvwxyzabcdefghij");
    let grown = grow_matches(
        vec![Candidate::new(0, 9, 21, 30), Candidate::new(5, 14, 0, 9)],
        &query,
        &hit,
        false,
    );
    assert_eq!(
        grown,
        vec![Candidate::new(0, 3, 21, 24), Candidate::new(5, 14, 0, 9)]
    );
}

#[test]
fn growth_into_neighbor_is_pulled_forward() {
    let query = chars("abcdefghij");
    let hit = chars("cdefgh11111111111111abcZ");
    let grown = grow_matches(
        vec![Candidate::new(0, 2, 20, 22), Candidate::new(5, 7, 3, 5)],
        &query,
        &hit,
        true,
    );
    assert_eq!(
        grown,
        vec![Candidate::new(0, 2, 20, 22), Candidate::new(4, 7, 2, 5)]
    );
}

#[test]
fn growth_aligns_divergent_spacing_and_trims() {
    let query = chars("  Hello,   world  ");
    let hit = chars("xxhello !  world yy");
    // Seed on "world" in both texts.
    let grown = grow_matches(vec![Candidate::new(11, 15, 11, 15)], &query, &hit, true);
    let m = grown[0];
    assert_eq!((m.query_start, m.query_end), (2, 15));
    assert_eq!((m.hit_start, m.hit_end), (2, 15));
}

#[test]
fn collect_drops_out_of_text_ranges() {
    let out = collect_overlaps(
        &[
            Candidate::new(0, 3, 0, 3),
            Candidate::new(2, 6, 40, 50),
            Candidate::new(5, 4, 8, 9),
        ],
        10,
        20,
    )
    .unwrap();
    assert_eq!(out.query, vec![Range::new(0, 6)]);
    assert_eq!(out.hit, vec![Range::new(0, 3), Range::new(8, 9)]);
}

// ==================== Configuration ====================

#[test]
fn invalid_config_is_rejected() {
    let winnower = Winnower::new(Normalizer::identity(), PerceptualConfig::default()).unwrap();
    let err = Reconstructor::new(winnower, MatchConfig::new().with_max_separation(0)).unwrap_err();
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}
