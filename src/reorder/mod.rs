//! Drag-to-reorder state for a flat list.
//!
//! The state only remembers positions. It never looks at item contents; the
//! owner receives the reordered sequence and decides what to do with it.

/// Something rendered in a reorderable list.
///
/// Items with a stable identifier keep it as their render key. Items without
/// one fall back to their position for the duration of a render.
pub trait ListItem {
    fn item_id(&self) -> Option<&str> {
        None
    }
}

pub fn item_key<T: ListItem>(item: &T, index: usize) -> String {
    match item.item_id() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("#{index}"),
    }
}

/// Move the element at `from` so it ends up at `to`.
///
/// `to` is read against the sequence after the element was removed, so this
/// is a move and not a swap. Targets past the end append. Returns `None` when
/// `from` is out of range or the move would not change anything.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || from == to {
        return None;
    }

    let mut next = items.to_vec();
    let moved = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, moved);
    Some(next)
}

/// `DataTransfer` payload naming the list a drag started in and the row.
pub fn drag_payload(list_id: &str, index: usize) -> String {
    format!("{list_id}:{index}")
}

/// Row index of a payload written by [`drag_payload`] for `list_id`. Drags
/// started in any other list (an enclosing or sibling one) yield `None`.
pub fn parse_drag_payload(payload: &str, list_id: &str) -> Option<usize> {
    let (owner, index) = payload.rsplit_once(':')?;
    if owner != list_id {
        return None;
    }
    index.parse().ok()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    dragged: Option<usize>,
    over: Option<usize>,
}

impl DragState {
    pub fn begin_drag(&mut self, index: usize) {
        self.dragged = Some(index);
    }

    /// Hover feedback only.
    pub fn drag_over(&mut self, index: usize) {
        self.over = Some(index);
    }

    /// Finish a drag on `index`. Returns the reordered sequence when the drop
    /// moved something. Dropping onto the source leaves the state for
    /// `end_drag` to clear.
    pub fn drop_on<T: Clone>(&mut self, items: &[T], index: usize) -> Option<Vec<T>> {
        let from = self.dragged?;
        if from == index {
            return None;
        }

        let next = move_item(items, from, index);
        self.end_drag();
        next
    }

    pub fn end_drag(&mut self) {
        self.dragged = None;
        self.over = None;
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    pub fn over(&self) -> Option<usize> {
        self.over
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<&'static str> {
        vec!["A", "B", "C"]
    }

    #[test]
    fn test_drag_payload_is_scoped_to_its_list() {
        let payload = drag_payload("cities-1", 2);
        assert_eq!(parse_drag_payload(&payload, "cities-1"), Some(2));
        assert_eq!(parse_drag_payload(&payload, "countries"), None);
        assert_eq!(parse_drag_payload("", "countries"), None);
        assert_eq!(parse_drag_payload("countries:x", "countries"), None);
    }

    #[test]
    fn test_nested_drag_does_not_reorder_enclosing_list() {
        // France[Paris], Italy[Rome]: a city drag never starts the country list.
        let countries = vec!["France", "Italy"];
        let mut country_list = DragState::default();
        let mut city_list = DragState::default();

        city_list.begin_drag(0);
        let payload = drag_payload("cities-france", 0);

        // Dropped over the Italy row: the country list neither owns the
        // payload nor has a drag of its own.
        assert_eq!(parse_drag_payload(&payload, "countries"), None);
        assert_eq!(country_list.drop_on(&countries, 1), None);
        assert!(!country_list.is_dragging());
        assert!(city_list.is_dragging());
    }

    fn drag(items: &[&'static str], from: usize, to: usize) -> Option<Vec<&'static str>> {
        let mut st = DragState::default();
        st.begin_drag(from);
        st.drag_over(to);
        st.drop_on(items, to)
    }

    #[test]
    fn test_drag_first_to_last() {
        assert_eq!(drag(&abc(), 0, 2), Some(vec!["B", "C", "A"]));
    }

    #[test]
    fn test_drag_last_to_first() {
        assert_eq!(drag(&abc(), 2, 0), Some(vec!["C", "A", "B"]));
    }

    #[test]
    fn test_move_is_not_a_swap() {
        let items = vec![1, 2, 3, 4, 5];
        // A swap would give [4, 2, 3, 1, 5].
        assert_eq!(move_item(&items, 0, 3), Some(vec![2, 3, 4, 1, 5]));
        assert_eq!(move_item(&items, 4, 1), Some(vec![1, 5, 2, 3, 4]));
    }

    #[test]
    fn test_move_matches_remove_then_insert_for_all_pairs() {
        let items: Vec<u32> = (0..6).collect();
        for from in 0..items.len() {
            for to in 0..items.len() {
                let got = move_item(&items, from, to);
                if from == to {
                    assert!(got.is_none());
                    continue;
                }
                let mut expected = items.clone();
                let x = expected.remove(from);
                expected.insert(to, x);
                assert_eq!(got, Some(expected), "from {from} to {to}");
            }
        }
    }

    #[test]
    fn test_drop_on_same_index_is_noop() {
        let mut st = DragState::default();
        st.begin_drag(1);
        assert!(st.drop_on(&abc(), 1).is_none());
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut st = DragState::default();
        st.drag_over(2);
        assert!(st.drop_on(&abc(), 2).is_none());
    }

    #[test]
    fn test_drop_clears_state() {
        let mut st = DragState::default();
        st.begin_drag(0);
        st.drag_over(1);
        assert!(st.drop_on(&abc(), 1).is_some());
        assert!(!st.is_dragging());
        assert_eq!(st.over(), None);
        // A second drop without a new drag does nothing.
        assert!(st.drop_on(&abc(), 2).is_none());
    }

    #[test]
    fn test_end_drag_cancels() {
        let mut st = DragState::default();
        st.begin_drag(0);
        st.drag_over(2);
        st.end_drag();
        assert_eq!(st, DragState::default());
        assert!(st.drop_on(&abc(), 2).is_none());
    }

    #[test]
    fn test_out_of_range_source_is_ignored() {
        assert!(move_item(&abc(), 3, 0).is_none());
    }

    #[test]
    fn test_target_past_end_appends() {
        assert_eq!(move_item(&abc(), 0, 9), Some(vec!["B", "C", "A"]));
    }

    struct Keyed(Option<&'static str>);

    impl ListItem for Keyed {
        fn item_id(&self) -> Option<&str> {
            self.0
        }
    }

    #[test]
    fn test_item_key_prefers_id_and_falls_back_to_index() {
        assert_eq!(item_key(&Keyed(Some("c-1")), 4), "c-1");
        assert_eq!(item_key(&Keyed(None), 4), "#4");
        assert_eq!(item_key(&Keyed(Some("")), 2), "#2");
    }
}
