//! Filtered and sorted note views.
//!
//! # Responsibility
//! - Apply the category filter, the tag substring filter and the sort option
//!   to a borrowed collection.
//!
//! # Invariants
//! - Views are computed on copies; the source order is never touched.
//! - Sorting is stable, so ties keep their filtered order.

use crate::model::note::{compare_titles, Note, NoteCategory, SortOption};
use std::cmp::Ordering;

/// View selector passed by list screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    /// Completion-state filter. Defaults to `all`.
    pub category: NoteCategory,
    /// Ordering. Defaults to `newest`.
    pub sort: SortOption,
    /// Case-insensitive tag substring. Empty means no tag filter.
    pub tag: Option<String>,
}

impl NoteQuery {
    pub fn new(category: NoteCategory, sort: SortOption, tag: Option<&str>) -> Self {
        Self {
            category,
            sort,
            tag: tag.map(str::to_string),
        }
    }

    /// Returns the matching notes in view order.
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        let needle = self
            .tag
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .map(str::to_lowercase);

        let mut view: Vec<Note> = notes
            .iter()
            .filter(|note| self.category.matches(note))
            .filter(|note| {
                needle
                    .as_deref()
                    .map_or(true, |needle| note.has_tag_containing(needle))
            })
            .cloned()
            .collect();

        sort_notes(&mut view, self.sort);
        view
    }
}

/// Stable in-place sort by `sort`.
pub fn sort_notes(notes: &mut [Note], sort: SortOption) {
    match sort {
        SortOption::Newest => notes.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Oldest => notes.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::Priority => notes.sort_by(|a, b| b.priority_rank().cmp(&a.priority_rank())),
        SortOption::Title => notes.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOption::DueDate => notes.sort_by(compare_due_dates),
    }
}

/// Ascending by parsed due date, then notes whose due date cannot be
/// parsed, then undated notes. A blank due date counts as undated, and
/// undated notes compare equal to each other.
fn compare_due_dates(a: &Note, b: &Note) -> Ordering {
    due_date_key(a).cmp(&due_date_key(b))
}

fn due_date_key(note: &Note) -> (u8, Option<i64>) {
    let due_date = note.due_date.as_deref().filter(|due| !due.trim().is_empty());
    match (due_date, note.due_timestamp()) {
        (Some(_), Some(timestamp)) => (0, Some(timestamp)),
        (Some(_), None) => (1, None),
        (None, _) => (2, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::{NoteId, NoteOptions, NotePriority};
    use chrono::{TimeZone, Utc};

    fn note(id: &str, created_secs: i64, options: NoteOptions) -> Note {
        let created = Utc.timestamp_opt(created_secs, 0).single().unwrap();
        Note::new(NoteId::from(id), id, "", created).with_options(options)
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|note| note.id.as_str()).collect()
    }

    #[test]
    fn empty_tag_filter_is_ignored() {
        let notes = vec![note("a", 1, NoteOptions::default())];
        let view = NoteQuery::new(NoteCategory::All, SortOption::Newest, Some("")).apply(&notes);
        assert_eq!(ids(&view), vec!["a"]);
    }

    #[test]
    fn tag_filter_is_case_insensitive_substring_and_drops_untagged() {
        let notes = vec![
            note("work", 1, NoteOptions::default().tags(["Work-Items"])),
            note("home", 2, NoteOptions::default().tags(["home"])),
            note("bare", 3, NoteOptions::default()),
        ];
        let view =
            NoteQuery::new(NoteCategory::All, SortOption::Oldest, Some("ORK")).apply(&notes);
        assert_eq!(ids(&view), vec!["work"]);
    }

    #[test]
    fn newest_and_oldest_order_by_created_at() {
        let mut notes = vec![
            note("mid", 2, NoteOptions::default()),
            note("old", 1, NoteOptions::default()),
            note("new", 3, NoteOptions::default()),
        ];
        sort_notes(&mut notes, SortOption::Newest);
        assert_eq!(ids(&notes), vec!["new", "mid", "old"]);
        sort_notes(&mut notes, SortOption::Oldest);
        assert_eq!(ids(&notes), vec!["old", "mid", "new"]);
    }

    #[test]
    fn priority_ties_keep_input_order() {
        let mut notes = vec![
            note("low-1", 1, NoteOptions::default().priority(NotePriority::Low)),
            note("high", 2, NoteOptions::default().priority(NotePriority::High)),
            note("low-2", 3, NoteOptions::default().priority(NotePriority::Low)),
        ];
        sort_notes(&mut notes, SortOption::Priority);
        assert_eq!(ids(&notes), vec!["high", "low-1", "low-2"]);
    }

    #[test]
    fn unparseable_due_date_sorts_between_dated_and_undated() {
        let mut notes = vec![
            note("undated", 1, NoteOptions::default()),
            note("garbled", 2, NoteOptions::default().due_date("someday")),
            note("dated", 3, NoteOptions::default().due_date("2024-02-01")),
        ];
        sort_notes(&mut notes, SortOption::DueDate);
        assert_eq!(ids(&notes), vec!["dated", "garbled", "undated"]);
    }

    #[test]
    fn blank_due_date_ties_with_undated() {
        let mut notes = vec![
            note("undated", 1, NoteOptions::default()),
            note("empty-due", 2, NoteOptions::default().due_date("")),
            note("blank-due", 3, NoteOptions::default().due_date("  ")),
            note("dated", 4, NoteOptions::default().due_date("2024-02-01")),
        ];
        sort_notes(&mut notes, SortOption::DueDate);
        assert_eq!(ids(&notes), vec!["dated", "undated", "empty-due", "blank-due"]);
    }
}
