//! Selection Set: the working set of candidate ids targeted by a pending
//! bulk action. Backed by a `BTreeSet` so batched requests and tests see a
//! deterministic id order.

use std::collections::BTreeSet;

use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    ids: BTreeSet<Uuid>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns whether the id is
    /// selected afterwards. Two calls restore the original state.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
            true
        } else {
            false
        }
    }

    /// Select All / Deselect All toggle against the current derived view.
    ///
    /// If the selection already equals `view_ids` as a set, the whole
    /// selection is cleared. Otherwise it is **replaced** with exactly the
    /// visible ids; previously selected ids that are no longer visible are
    /// dropped, not unioned in.
    pub fn select_all_visible(&mut self, view_ids: &[Uuid]) {
        let visible: BTreeSet<Uuid> = view_ids.iter().copied().collect();
        if self.ids == visible {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Snapshot of the selected ids, ready for a batched request.
    pub fn ids(&self) -> Vec<Uuid> {
        self.ids.iter().copied().collect()
    }
}
