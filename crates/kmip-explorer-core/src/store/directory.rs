// ── Object directory ──
//
// The authoritative list of objects shown by the explorer, in server
// order, with the derived rows, the search narrowing and the selection.
// Row 0 means "nothing selected"; rows 1..=N address visible rows.
//
// Mutations queue `DirectoryEvent`s which the view drains after applying
// an update, so rendering always reflects the patched state.

use chrono::Utc;

use super::row::{DirectoryRow, project};
use crate::model::AttributeSet;

/// Change notification for the view adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryEvent {
    /// The selected row, or the content of the selected object, changed.
    SelectionChanged { row: usize },
    /// Rows were rebuilt.
    ContentUpdated,
}

#[derive(Debug, Default)]
pub struct Directory {
    objects: Vec<AttributeSet>,
    /// Parallel to `objects`.
    rows: Vec<DirectoryRow>,
    /// Indexes into `objects` that pass the search.
    visible: Vec<usize>,
    search: String,
    selected: usize,
    events: Vec<DirectoryEvent>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Content ──────────────────────────────────────────────────────

    /// Replace every object. With `reset_selection` the first row is
    /// selected, otherwise the current row is kept within bounds.
    pub fn set_objects(&mut self, objects: Vec<AttributeSet>, reset_selection: bool) {
        self.objects = objects;
        self.rebuild();
        self.selected = if reset_selection {
            usize::from(!self.visible.is_empty())
        } else {
            self.selected.min(self.visible.len())
        };
        self.events.push(DirectoryEvent::SelectionChanged {
            row: self.selected,
        });
        self.events.push(DirectoryEvent::ContentUpdated);
    }

    /// Drop every object and reset the selection.
    pub fn clear(&mut self) {
        self.set_objects(Vec::new(), true);
    }

    /// Remove the object with `id`. Returns `false`, without notifying,
    /// when no such object is listed.
    pub fn remove_object(&mut self, id: &str) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let before = self.selection().cloned();
        self.objects.remove(pos);
        self.patched(before);
        true
    }

    /// Replace the object sharing `attributes.id`. Returns `false`, without
    /// notifying, when no such object is listed.
    pub fn update_object(&mut self, attributes: AttributeSet) -> bool {
        let Some(pos) = self.position(&attributes.id) else {
            return false;
        };
        let before = self.selection().cloned();
        self.objects[pos] = attributes;
        self.patched(before);
        true
    }

    pub fn objects(&self) -> &[AttributeSet] {
        &self.objects
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &DirectoryRow> {
        self.visible.iter().map(|&i| &self.rows[i])
    }

    /// Table title, e.g. `All Objects [3/12]`.
    pub fn title(&self, label: &str) -> String {
        format!("{label} [{}/{}]", self.selected, self.visible.len())
    }

    // ── Search ───────────────────────────────────────────────────────

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Narrow the visible rows to those matching `query`. An empty query
    /// shows everything.
    pub fn set_search(&mut self, query: &str) {
        if self.search == query {
            return;
        }
        query.clone_into(&mut self.search);
        self.rebuild_visible();
        self.selected = usize::from(!self.visible.is_empty());
        self.events.push(DirectoryEvent::SelectionChanged {
            row: self.selected,
        });
        self.events.push(DirectoryEvent::ContentUpdated);
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Selected row number, 0 when nothing is selected.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selection(&self) -> Option<&AttributeSet> {
        let index = self.selected.checked_sub(1)?;
        self.visible.get(index).map(|&i| &self.objects[i])
    }

    pub fn selected_row(&self) -> Option<&DirectoryRow> {
        let index = self.selected.checked_sub(1)?;
        self.visible.get(index).map(|&i| &self.rows[i])
    }

    pub fn select(&mut self, row: usize) {
        let row = row.min(self.visible.len());
        if row != self.selected {
            self.selected = row;
            self.events.push(DirectoryEvent::SelectionChanged { row });
        }
    }

    pub fn select_next(&mut self) {
        if !self.visible.is_empty() {
            self.select(self.selected + 1);
        }
    }

    pub fn select_prev(&mut self) {
        if !self.visible.is_empty() {
            self.select(self.selected.saturating_sub(1).max(1));
        }
    }

    pub fn select_first(&mut self) {
        self.select(usize::from(!self.visible.is_empty()));
    }

    pub fn select_last(&mut self) {
        self.select(self.visible.len());
    }

    pub fn page_down(&mut self, page: usize) {
        if !self.visible.is_empty() {
            self.select(self.selected.saturating_add(page));
        }
    }

    pub fn page_up(&mut self, page: usize) {
        if !self.visible.is_empty() {
            self.select(self.selected.saturating_sub(page).max(1));
        }
    }

    /// Drain pending notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<DirectoryEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn position(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn rebuild(&mut self) {
        let now = Utc::now();
        self.rows = self.objects.iter().map(|o| project(o, now)).collect();
        self.rebuild_visible();
    }

    fn rebuild_visible(&mut self) {
        let needle = self.search.to_lowercase();
        self.visible = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| needle.is_empty() || row.matches(&needle))
            .map(|(i, _)| i)
            .collect();
    }

    /// Rebuild after a single-object patch and notify.
    fn patched(&mut self, before: Option<AttributeSet>) {
        self.rebuild();
        self.selected = self.selected.min(self.visible.len());
        self.events.push(DirectoryEvent::ContentUpdated);
        if self.selection() != before.as_ref() {
            self.events.push(DirectoryEvent::SelectionChanged {
                row: self.selected,
            });
        }
    }
}
