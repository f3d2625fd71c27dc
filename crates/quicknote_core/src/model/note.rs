//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted in the storage slot.
//! - Define the closed value sets used by UI filters and sort selectors.
//! - Provide merge helpers for creation options and partial updates.
//!
//! # Invariants
//! - `id` is stable and never reassigned after creation.
//! - `updated_at` is never earlier than `created_at`.
//! - Serialized field names are camelCase and absent optionals are omitted,
//!   matching slots written by the browser build.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use icu_collator::{Collator, CollatorOptions};
use icu_provider::DataLocale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

const ID_RANDOM_SUFFIX_LEN: usize = 9;

/// Error returned when a wire name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseValueError {
    /// Value set being parsed (`priority`, `color`, ...).
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseValueError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Opaque note identifier.
///
/// Generated ids are a millisecond clock prefix followed by nine random
/// base-36 characters. Ids loaded from storage are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh id from the given creation instant.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut id = now.timestamp_millis().to_string();
        id.push_str(&random_base36(ID_RANDOM_SUFFIX_LEN));
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Note importance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePriority {
    Low,
    Medium,
    High,
}

impl NotePriority {
    /// Sort rank: high=3, medium=2, low=1. Absent priority ranks 0.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for NotePriority {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParseValueError::new("priority", other)),
        }
    }
}

impl Display for NotePriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card color from the fixed UI palette. `None` is an explicit "no color".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Blue,
    Green,
    Yellow,
    Red,
    Purple,
    Pink,
    Gray,
    None,
}

impl NoteColor {
    pub const ALL: [NoteColor; 8] = [
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Red,
        Self::Purple,
        Self::Pink,
        Self::Gray,
        Self::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Gray => "gray",
            Self::None => "none",
        }
    }
}

impl FromStr for NoteColor {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == value)
            .ok_or_else(|| ParseValueError::new("color", value))
    }
}

impl Display for NoteColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion-state view selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    #[default]
    All,
    Active,
    Completed,
}

impl NoteCategory {
    /// Returns whether the note belongs to this view.
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Active => !note.completed,
            Self::Completed => note.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for NoteCategory {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(ParseValueError::new("category", other)),
        }
    }
}

impl Display for NoteCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied to a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    Priority,
    Title,
    DueDate,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Priority => "priority",
            Self::Title => "title",
            Self::DueDate => "dueDate",
        }
    }
}

impl FromStr for SortOption {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "priority" => Ok(Self::Priority),
            "title" => Ok(Self::Title),
            "dueDate" | "due_date" => Ok(Self::DueDate),
            other => Err(ParseValueError::new("sort option", other)),
        }
    }
}

impl Display for SortOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<NotePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    /// Date string as entered by the user (`YYYY-MM-DD` from date pickers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Free-text label, unrelated to [`NoteCategory`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Note {
    /// Creates an incomplete note stamped with `now` for both timestamps.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            completed: false,
            created_at: now,
            updated_at: now,
            priority: None,
            tags: None,
            color: None,
            due_date: None,
            category: None,
        }
    }

    /// Copies creation options verbatim onto the note.
    pub fn with_options(mut self, options: NoteOptions) -> Self {
        self.category = options.category;
        self.priority = options.priority;
        self.tags = options.tags;
        self.color = options.color;
        self.due_date = options.due_date;
        self
    }

    /// Merges `patch` over this note and stamps `updated_at`.
    ///
    /// `updated_at` is clamped to `created_at` so a clock that moved
    /// backwards cannot break the timestamp ordering.
    pub fn apply_patch(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Priority rank with absent priority mapped to 0.
    pub fn priority_rank(&self) -> u8 {
        self.priority.map_or(0, NotePriority::rank)
    }

    /// Returns whether any tag contains `needle_lower` (already lowercased).
    pub fn has_tag_containing(&self, needle_lower: &str) -> bool {
        self.tags.as_deref().is_some_and(|tags| {
            tags.iter()
                .any(|tag| tag.to_lowercase().contains(needle_lower))
        })
    }

    /// Parsed due date as epoch milliseconds, when present and readable.
    pub fn due_timestamp(&self) -> Option<i64> {
        self.due_date.as_deref().and_then(parse_due_date)
    }
}

/// Optional fields accepted when creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteOptions {
    pub category: Option<String>,
    pub priority: Option<NotePriority>,
    pub tags: Option<Vec<String>>,
    pub color: Option<NoteColor>,
    pub due_date: Option<String>,
}

impl NoteOptions {
    pub fn priority(mut self, priority: NotePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn color(mut self, color: NoteColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Partial update merged over an existing note.
///
/// Outer `None` leaves a field untouched. For optional note fields the
/// inner `None` clears the value. `id` and `created_at` are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Option<NotePriority>>,
    pub tags: Option<Option<Vec<String>>>,
    pub color: Option<Option<NoteColor>>,
    pub due_date: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn priority(mut self, priority: Option<NotePriority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn color(mut self, color: Option<NoteColor>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn due_date(mut self, due_date: Option<String>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    /// True when the patch would only refresh `updated_at`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Parses a due date into epoch milliseconds.
///
/// Accepts RFC 3339 timestamps, bare `YYYY-MM-DD` dates (midnight UTC) and
/// `YYYY-MM-DDTHH:MM[:SS]` local-less datetimes (read as UTC).
pub fn parse_due_date(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.and_utc().timestamp_millis())
}

thread_local! {
    static TITLE_COLLATOR: Option<Collator> =
        Collator::try_new(&DataLocale::default(), CollatorOptions::new()).ok();
}

/// Locale-aware title comparison using the CLDR root collation.
///
/// Accented letters sort next to their base letter (`é` with `e`, `ё` with
/// `е`), lowercase before uppercase on case-only ties.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    TITLE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(left, right),
        None => fold_case_compare(left, right),
    })
}

// Only reached if the compiled collation data fails to load.
fn fold_case_compare(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
        .then_with(|| left.cmp(right))
}

fn random_base36(len: usize) -> String {
    // v4 randomness covers the low 62 bits, more than nine base-36 digits need.
    let mut value = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let digit = (value % 36) as u32;
        out.push(char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    out
}
