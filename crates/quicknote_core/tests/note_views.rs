use chrono::{DateTime, Duration, TimeZone, Utc};
use quicknote_core::{
    Clock, MemoryStorage, NoteCategory, NoteOptions, NotePriority, NoteQuery, NoteStats,
    NoteStore, SortOption,
};
use std::cell::Cell;

struct StepClock(Cell<DateTime<Utc>>);

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.0.get();
        self.0.set(now + Duration::seconds(1));
        now
    }
}

fn step_clock() -> StepClock {
    StepClock(Cell::new(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()))
}

fn titles(notes: &[quicknote_core::Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

#[test]
fn due_date_sort_puts_undated_last() {
    let clock = step_clock();
    let mut store = NoteStore::with_clock(MemoryStorage::new(), &clock);
    store.add("jan", "", NoteOptions::default().due_date("2024-01-01"));
    store.add("none", "", NoteOptions::default());
    store.add("may", "", NoteOptions::default().due_date("2023-05-05"));

    let view = store.filtered_and_sorted(NoteCategory::All, SortOption::DueDate, None);
    assert_eq!(titles(&view), vec!["may", "jan", "none"]);
}

#[test]
fn priority_sort_ranks_high_to_absent() {
    let clock = step_clock();
    let mut store = NoteStore::with_clock(MemoryStorage::new(), &clock);
    store.add("absent", "", NoteOptions::default());
    store.add("low", "", NoteOptions::default().priority(NotePriority::Low));
    store.add("high", "", NoteOptions::default().priority(NotePriority::High));
    store.add("medium", "", NoteOptions::default().priority(NotePriority::Medium));

    let view = store.filtered_and_sorted(NoteCategory::All, SortOption::Priority, None);
    assert_eq!(titles(&view), vec!["high", "medium", "low", "absent"]);
}

#[test]
fn newest_and_oldest_follow_created_at() {
    let clock = step_clock();
    let mut store = NoteStore::with_clock(MemoryStorage::new(), &clock);
    store.add("one", "", NoteOptions::default());
    store.add("two", "", NoteOptions::default());
    store.add("three", "", NoteOptions::default());

    let newest = store.filtered_and_sorted(NoteCategory::All, SortOption::Newest, None);
    assert_eq!(titles(&newest), vec!["three", "two", "one"]);
    let oldest = store.filtered_and_sorted(NoteCategory::All, SortOption::Oldest, None);
    assert_eq!(titles(&oldest), vec!["one", "two", "three"]);
}

#[test]
fn title_sort_ignores_case() {
    let mut store = NoteStore::new(MemoryStorage::new());
    store.add("banana", "", NoteOptions::default());
    store.add("Cherry", "", NoteOptions::default());
    store.add("apple", "", NoteOptions::default());

    let view = store.filtered_and_sorted(NoteCategory::All, SortOption::Title, None);
    assert_eq!(titles(&view), vec!["apple", "banana", "Cherry"]);
}

#[test]
fn title_sort_collates_accented_and_cyrillic_titles() {
    let mut store = NoteStore::new(MemoryStorage::new());
    for title in ["zebra", "éclair", "яблоко", "ёлка", "жук"] {
        store.add(title, "", NoteOptions::default());
    }

    let view = store.filtered_and_sorted(NoteCategory::All, SortOption::Title, None);
    assert_eq!(titles(&view), vec!["éclair", "zebra", "ёлка", "жук", "яблоко"]);
}

#[test]
fn due_date_sort_treats_empty_due_date_as_undated() {
    let clock = step_clock();
    let mut store = NoteStore::with_clock(MemoryStorage::new(), &clock);
    store.add("empty-due", "", NoteOptions::default().due_date(""));
    store.add("undated", "", NoteOptions::default());

    let view = store.filtered_and_sorted(NoteCategory::All, SortOption::DueDate, None);
    assert_eq!(titles(&view), vec!["undated", "empty-due"]);
}

#[test]
fn category_and_tag_filters_combine() {
    let mut store = NoteStore::new(MemoryStorage::new());
    let done = store.add("done-work", "", NoteOptions::default().tags(["Work"]));
    store.add("open-work", "", NoteOptions::default().tags(["homework"]));
    store.add("open-home", "", NoteOptions::default().tags(["home"]));
    store.add("open-bare", "", NoteOptions::default());
    store.toggle(&done.id);

    let active = store.query(&NoteQuery::new(
        NoteCategory::Active,
        SortOption::Title,
        Some("WORK"),
    ));
    assert_eq!(titles(&active), vec!["open-work"]);

    let completed = store.filtered_and_sorted(NoteCategory::Completed, SortOption::Title, None);
    assert_eq!(titles(&completed), vec!["done-work"]);

    let all_active = store.filtered_and_sorted(NoteCategory::Active, SortOption::Title, None);
    assert_eq!(all_active.len(), 3);
}

#[test]
fn views_do_not_reorder_the_store() {
    let mut store = NoteStore::new(MemoryStorage::new());
    store.add("b", "", NoteOptions::default());
    store.add("a", "", NoteOptions::default());
    let before = store.notes().to_vec();

    let _ = store.filtered_and_sorted(NoteCategory::All, SortOption::Title, None);
    assert_eq!(store.notes(), before.as_slice());
}

#[test]
fn all_tags_is_sorted_case_sensitive_and_distinct() {
    let mut store = NoteStore::new(MemoryStorage::new());
    store.add("one", "", NoteOptions::default().tags(["a", "B"]));
    store.add("two", "", NoteOptions::default().tags(["b"]));
    store.add("three", "", NoteOptions::default().tags(Vec::<String>::new()));
    store.add("four", "", NoteOptions::default().tags(["a"]));

    assert_eq!(store.all_tags(), vec!["B", "a", "b"]);
}

#[test]
fn all_tags_orders_by_utf16_code_unit() {
    let mut store = NoteStore::new(MemoryStorage::new());
    store.add("replacement", "", NoteOptions::default().tags(["\u{FFFD}"]));
    store.add("emoji", "", NoteOptions::default().tags(["\u{1F600}"]));

    assert_eq!(store.all_tags(), vec!["\u{1F600}", "\u{FFFD}"]);
}

#[test]
fn stats_count_active_and_completed() {
    let mut store = NoteStore::new(MemoryStorage::new());
    let ids: Vec<_> = (0..5)
        .map(|idx| store.add(format!("n{idx}"), "", NoteOptions::default()).id)
        .collect();
    store.toggle(&ids[0]);
    store.toggle(&ids[3]);

    assert_eq!(
        store.stats(),
        NoteStats {
            total: 5,
            active: 3,
            completed: 2,
        }
    );
}
