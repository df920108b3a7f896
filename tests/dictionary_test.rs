//! Sampling from a WordNet-shaped fixture database

mod common;

use common::{write_dictionary, ADJECTIVES, NOUNS};
use jrp::dictionary::{Dictionary, WordSource};
use jrp::error::ErrorKind;
use jrp::models::{LemmaFilter, PartOfSpeech};

#[test]
fn test_missing_dictionary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dictionary::open(dir.path().join("wnjpn.db")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DictionaryMissing);
}

#[test]
fn test_only_japanese_words_of_the_requested_pos() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let adjectives = dictionary.sample_words(PartOfSpeech::Adjective, None, 2).unwrap();
    assert_eq!(adjectives.len(), 2);
    for word in &adjectives {
        assert!(ADJECTIVES.contains(&word.lemma.as_str()));
        assert_eq!(word.part_of_speech, PartOfSpeech::Adjective);
    }

    let nouns = dictionary.sample_words(PartOfSpeech::Noun, None, 2).unwrap();
    let mut lemmas: Vec<&str> = nouns.iter().map(|w| w.lemma.as_str()).collect();
    lemmas.sort_unstable();
    let mut expected = NOUNS.to_vec();
    expected.sort_unstable();
    assert_eq!(lemmas, expected);
}

#[test]
fn test_prefix_filter_is_anchored() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let filter = LemmaFilter::StartsWith("赤".to_string());
    let words = dictionary.sample_words(PartOfSpeech::Adjective, Some(&filter), 1).unwrap();
    assert_eq!(words[0].lemma, "赤い");

    // "い" appears in both adjectives but never at the start
    let filter = LemmaFilter::StartsWith("い".to_string());
    let err = dictionary.sample_words(PartOfSpeech::Adjective, Some(&filter), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DictionaryEmpty);
}

#[test]
fn test_suffix_filter_is_anchored() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let filter = LemmaFilter::EndsWith("船".to_string());
    let words = dictionary.sample_words(PartOfSpeech::Noun, Some(&filter), 1).unwrap();
    assert_eq!(words[0].lemma, "船");
}

#[test]
fn test_more_than_candidates_samples_with_replacement() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let words = dictionary.sample_words(PartOfSpeech::Noun, None, 9).unwrap();
    assert_eq!(words.len(), 9);
    assert!(words.iter().all(|w| NOUNS.contains(&w.lemma.as_str())));

    let seeded = Dictionary::with_seed(dictionary.path(), 3).unwrap();
    assert_eq!(seeded.sample_words(PartOfSpeech::Noun, None, 9).unwrap().len(), 9);
}

#[test]
fn test_seeded_sampling_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dictionary(dir.path());

    let draw = |seed| {
        let dictionary = Dictionary::with_seed(&path, seed).unwrap();
        (0..5)
            .map(|_| dictionary.sample_words(PartOfSpeech::Adjective, None, 1).unwrap()[0].word_id)
            .collect::<Vec<_>>()
    };

    assert_eq!(draw(42), draw(42));
}

#[test]
fn test_empty_pos_is_dictionary_empty() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let err = dictionary.sample_words(PartOfSpeech::Adverb, None, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DictionaryEmpty);
}

#[test]
fn test_sample_words_is_distinct_while_it_can_be() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dictionary(dir.path());

    let dictionary = Dictionary::open(&path).unwrap();
    let seeded = Dictionary::with_seed(&path, 11).unwrap();
    for source in [&dictionary, &seeded] {
        for _ in 0..20 {
            let words = source.sample_words(PartOfSpeech::Adjective, None, 2).unwrap();
            assert_ne!(words[0].word_id, words[1].word_id);
        }
    }
}

#[test]
fn test_draw_words_repeat_within_a_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dictionary(dir.path());
    let dictionary = Dictionary::open(&path).unwrap();

    // Two candidates, two draws: independent draws repeat about half the time
    let repeats = (0..200)
        .filter(|_| {
            let words = dictionary.draw_words(PartOfSpeech::Adjective, None, 2).unwrap();
            words[0].word_id == words[1].word_id
        })
        .count();
    assert!(repeats > 0, "no repeats in 200 requests");
    assert!(repeats < 200, "every request repeated");

    let seeded_repeats = (0..200u64)
        .filter(|&seed| {
            let dictionary = Dictionary::with_seed(&path, seed).unwrap();
            let words = dictionary.draw_words(PartOfSpeech::Adjective, None, 2).unwrap();
            words[0].word_id == words[1].word_id
        })
        .count();
    assert!(seeded_repeats > 0, "no repeats across 200 seeds");
}

#[test]
fn test_draw_words_respects_filter_and_emptiness() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::open(write_dictionary(dir.path())).unwrap();

    let filter = LemmaFilter::EndsWith("車".to_string());
    let words = dictionary.draw_words(PartOfSpeech::Noun, Some(&filter), 5).unwrap();
    assert_eq!(words.len(), 5);
    assert!(words.iter().all(|w| w.lemma == "車"));

    let filter = LemmaFilter::StartsWith("黄".to_string());
    let err = dictionary.draw_words(PartOfSpeech::Adjective, Some(&filter), 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DictionaryEmpty);
}
