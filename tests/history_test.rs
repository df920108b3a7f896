//! History store behavior against a real SQLite file

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use common::Fixture;
use jrp::clock::FixedClock;
use jrp::db::HistoryStore;
use jrp::error::ErrorKind;
use jrp::models::{NewPhrase, SearchMode};

fn rows(phrases: &[&str]) -> Vec<NewPhrase> {
    phrases.iter().map(|p| NewPhrase::new(p, None, None)).collect()
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

#[test]
fn test_empty_history_reads_are_empty() {
    let fixture = Fixture::new();
    let store = fixture.store();

    assert!(store.get_recent(0).unwrap().is_empty());
    assert!(store.get_favorites(10).unwrap().is_empty());
    assert!(store.search(&keywords(&["赤"]), SearchMode::Or, 0).unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_save_assigns_ascending_ids_and_timestamps() {
    let fixture = Fixture::new();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let store = HistoryStore::with_clock(&fixture.history_path, Arc::new(FixedClock(now))).unwrap();

    let saved = store
        .save(&[NewPhrase::new("赤い車", Some("赤"), None), NewPhrase::new("青い船", None, Some("船"))])
        .unwrap();

    assert_eq!(saved.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(saved.iter().all(|p| p.created_at == now && p.updated_at == now && !p.is_favorited));

    let reloaded = store.get_by_ids(&[1]).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].prefix.as_deref(), Some("赤"));
    assert_eq!(reloaded[0].suffix, None);
    assert_eq!(reloaded[0].created_at, now);
}

#[test]
fn test_get_recent_limit_and_order() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二", "三"])).unwrap();

    let recent = store.get_recent(2).unwrap();
    assert_eq!(recent.iter().map(|p| p.phrase.as_str()).collect::<Vec<_>>(), vec!["三", "二"]);

    // n = 0 is unlimited
    assert_eq!(store.get_recent(0).unwrap().len(), 3);
}

#[test]
fn test_favorite_protects_from_remove_all() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車", "青い船", "赤い船"])).unwrap();

    let outcome = store.favorite_ids(&[2]).unwrap();
    assert_eq!(outcome.added, vec![2]);

    assert_eq!(store.remove_all(false).unwrap(), 2);
    let left = store.get_recent(0).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, 2);
    assert!(left[0].is_favorited);
}

#[test]
fn test_clear_resets_ids() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二", "三", "四", "五"])).unwrap();

    assert_eq!(store.remove_all(true).unwrap(), 5);
    let saved = store.save(&rows(&["六"])).unwrap();
    assert_eq!(saved[0].id, 1);
}

#[test]
fn test_non_forced_clear_of_only_plain_rows_resets_ids() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二"])).unwrap();

    store.remove_all(false).unwrap();
    assert_eq!(store.save(&rows(&["三"])).unwrap()[0].id, 1);
}

#[test]
fn test_removing_every_id_resets_ids() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二", "三"])).unwrap();
    store.favorite_ids(&[2]).unwrap();

    let outcome = store.remove_ids(&[1, 2, 3], true).unwrap();
    assert_eq!(outcome.removed, vec![1, 2, 3]);
    assert_eq!(store.count().unwrap(), 0);

    assert_eq!(store.save(&rows(&["四"])).unwrap()[0].id, 1);
}

#[test]
fn test_ids_keep_growing_while_rows_remain() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二"])).unwrap();

    store.remove_ids(&[2], false).unwrap();
    assert_eq!(store.save(&rows(&["三"])).unwrap()[0].id, 3);
}

#[test]
fn test_remove_ids_respects_favorites_unless_forced() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車", "青い船"])).unwrap();
    store.favorite_ids(&[1]).unwrap();

    let outcome = store.remove_ids(&[1, 2, 9], false).unwrap();
    assert_eq!(outcome.removed, vec![2]);
    assert_eq!(outcome.skipped_favorite, vec![1]);
    assert_eq!(outcome.not_found, vec![9]);
    assert_eq!(store.count().unwrap(), 1);

    let outcome = store.remove_ids(&[1], true).unwrap();
    assert_eq!(outcome.removed, vec![1]);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_favorite_reports_unchanged_ids() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車"])).unwrap();

    assert_eq!(store.favorite_ids(&[1]).unwrap().added, vec![1]);
    let again = store.favorite_ids(&[1, 5]).unwrap();
    assert!(again.added.is_empty());
    assert_eq!(again.not_added, vec![1, 5]);

    let removed = store.unfavorite_ids(&[1, 5]).unwrap();
    assert_eq!(removed.removed, vec![1]);
    assert_eq!(removed.not_removed, vec![5]);
}

#[test]
fn test_unfavorite_all() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["一", "二", "三"])).unwrap();
    store.favorite_ids(&[1, 3]).unwrap();

    assert_eq!(store.unfavorite_all().unwrap(), 2);
    assert!(store.get_favorites(0).unwrap().is_empty());
}

#[test]
fn test_search_and_versus_or() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車", "青い船"])).unwrap();

    let and = store.search(&keywords(&["赤", "船"]), SearchMode::And, 0).unwrap();
    assert!(and.is_empty());

    let or = store.search(&keywords(&["赤", "船"]), SearchMode::Or, 0).unwrap();
    assert_eq!(or.len(), 2);

    let both = store.search(&keywords(&["赤", "車"]), SearchMode::And, 0).unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].phrase, "赤い車");
}

#[test]
fn test_search_treats_wildcards_literally() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車", "100%の船"])).unwrap();

    let hits = store.search(&keywords(&["%"]), SearchMode::Or, 0).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].phrase, "100%の船");
}

#[test]
fn test_search_favorites_only_sees_favorites() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.save(&rows(&["赤い車", "赤い船"])).unwrap();
    store.favorite_ids(&[2]).unwrap();

    let hits = store.search_favorites(&keywords(&["赤"]), SearchMode::Or, 0).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 2);
}

#[test]
fn test_search_without_keywords_is_rejected() {
    let fixture = Fixture::new();
    let store = fixture.store();

    let err = store.search(&[], SearchMode::Or, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoKeywords);
    let err = store.search_favorites(&[], SearchMode::And, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoKeywords);
}

#[test]
fn test_history_survives_reopen() {
    let fixture = Fixture::new();
    fixture.store().save(&rows(&["赤い車"])).unwrap();

    let reopened = fixture.store();
    assert_eq!(reopened.count().unwrap(), 1);
}

fn phrase_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[あ-ん]{1,4}", 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_save_then_get_recent_is_reversed(phrases in phrase_strategy()) {
        let fixture = Fixture::new();
        let store = fixture.store();
        let new_rows: Vec<NewPhrase> = phrases.iter().map(|p| NewPhrase::new(p, None, None)).collect();

        store.save(&new_rows).unwrap();
        let recent: Vec<String> = store.get_recent(new_rows.len()).unwrap().into_iter().map(|p| p.phrase).collect();

        let mut expected = phrases.clone();
        expected.reverse();
        prop_assert_eq!(recent, expected);
    }

    #[test]
    fn prop_and_search_is_subset_of_or(
        phrases in phrase_strategy(),
        words in prop::collection::vec("[あ-ん]{1,2}", 1..3),
    ) {
        let fixture = Fixture::new();
        let store = fixture.store();
        let new_rows: Vec<NewPhrase> = phrases.iter().map(|p| NewPhrase::new(p, None, None)).collect();
        store.save(&new_rows).unwrap();

        let and = store.search(&words, SearchMode::And, 0).unwrap();
        let or = store.search(&words, SearchMode::Or, 0).unwrap();
        let or_ids: Vec<i64> = or.iter().map(|p| p.id).collect();
        prop_assert!(and.iter().all(|p| or_ids.contains(&p.id)));
    }

    #[test]
    fn prop_favorite_then_unfavorite_restores_flags(
        count in 1usize..6,
        picks in prop::collection::vec(1i64..8, 0..6),
    ) {
        let fixture = Fixture::new();
        let store = fixture.store();
        let new_rows: Vec<NewPhrase> = (0..count).map(|i| NewPhrase::new(&format!("語{i}"), None, None)).collect();
        store.save(&new_rows).unwrap();
        // Start from a mixed state
        store.favorite_ids(&[1]).unwrap();
        let before: Vec<bool> = store.get_recent(0).unwrap().into_iter().map(|p| p.is_favorited).collect();

        let added = store.favorite_ids(&picks).unwrap().added;
        store.unfavorite_ids(&added).unwrap();

        let after: Vec<bool> = store.get_recent(0).unwrap().into_iter().map(|p| p.is_favorited).collect();
        prop_assert_eq!(before, after);
    }
}
