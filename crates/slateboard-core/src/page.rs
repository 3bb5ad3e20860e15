//! Pages and their stacked element lists.

use crate::camera::Camera;
use crate::elements::{ArrowPath, Element, ElementId, ElementKind, Frame, GroupId};
use crate::history::{ElementStore, History, HistoryEntry};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a page.
pub type PageId = Uuid;

/// Elements of a page, kept front to back: index 0 is drawn last (on top)
/// and is the first candidate for hit testing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementList {
    elements: Vec<Element>,
}

impl ElementList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from elements in any order, stacking them by `order`.
    pub fn from_elements(mut elements: Vec<Element>) -> Self {
        elements.sort_by(|a, b| b.order.cmp(&a.order));
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Front to back.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    /// Back to front, in paint order.
    pub fn paint_order(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().rev()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_vec(self) -> Vec<Element> {
        self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn max_order(&self) -> Option<i64> {
        self.elements.iter().map(|e| e.order).max()
    }

    /// Order value that puts a new element above everything else.
    pub fn next_order(&self) -> i64 {
        self.max_order().map_or(0, |o| o + 1)
    }

    /// Insert at the position given by the element's `order`.
    pub fn insert(&mut self, element: Element) {
        let index = self
            .elements
            .iter()
            .position(|e| e.order < element.order)
            .unwrap_or(self.elements.len());
        self.elements.insert(index, element);
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Replace the element with the same id, restacking if its order changed.
    pub fn replace(&mut self, element: Element) -> bool {
        let Some(index) = self.elements.iter().position(|e| e.id() == element.id()) else {
            return false;
        };
        if self.elements[index].order == element.order {
            self.elements[index] = element;
        } else {
            self.elements.remove(index);
            self.insert(element);
        }
        true
    }

    /// Re-sort after bulk order changes.
    pub fn restack(&mut self) {
        self.elements.sort_by(|a, b| b.order.cmp(&a.order));
    }

    /// Topmost element under `point`, skipping elements mid-creation or erased.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<&Element> {
        self.elements
            .iter()
            .filter(|e| !e.creating && !e.erased)
            .find(|e| e.hit_test(point, tolerance))
    }

    /// Union of the frames of the given elements.
    pub fn bounding_frame(&self, ids: &[ElementId]) -> Option<Frame> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|e| e.frame.normalized())
            .reduce(|acc, f| acc.union(&f))
    }

    pub fn rect_of(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(Element::bounds)
    }

    /// Renderable path of an arrow element with bindings resolved.
    pub fn arrow_path(&self, element: &Element) -> Option<ArrowPath> {
        match &element.kind {
            ElementKind::Arrow(arrow) => Some(arrow.path(&|id| self.rect_of(id))),
            _ => None,
        }
    }

    /// Snap bound arrow ends to where their targets are now.
    ///
    /// Returns `(before, after)` for every arrow that moved.
    pub fn follow_bindings(&mut self) -> Vec<(Element, Element)> {
        let rects: HashMap<ElementId, Rect> =
            self.elements.iter().map(|e| (e.id(), e.bounds())).collect();
        let lookup = |id: ElementId| rects.get(&id).copied();
        let mut moved = Vec::new();
        for element in &mut self.elements {
            let bound = matches!(&element.kind, ElementKind::Arrow(arrow) if arrow.is_bound());
            if !bound {
                continue;
            }
            let before = element.clone();
            if let ElementKind::Arrow(arrow) = &mut element.kind {
                if arrow.follow_bindings(&mut element.frame, &lookup) {
                    moved.push((before, element.clone()));
                }
            }
        }
        moved
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(Element::id).collect()
    }
}

impl ElementStore for ElementList {
    fn insert_element(&mut self, element: Element) {
        self.insert(element);
    }

    fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        self.remove(id)
    }

    fn replace_element(&mut self, element: Element) -> bool {
        self.replace(element)
    }
}

/// A canvas page with its own elements, view and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub elements: ElementList,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub history: History,
    /// Group the user has entered; selection is confined to its members.
    #[serde(default)]
    pub active_group: Option<GroupId>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            elements: ElementList::new(),
            camera: Camera::default(),
            history: History::new(),
            active_group: None,
        }
    }

    /// Record an already applied change.
    pub fn record(&mut self, entry: HistoryEntry) {
        let kind = entry.kind;
        let count = entry.elements.len();
        if self.history.push(entry) {
            log::debug!("Coalesced {:?} of {} element(s)", kind, count);
        } else {
            log::debug!("Recorded {:?} of {} element(s)", kind, count);
        }
    }

    /// Undo the newest change. Clears selection and leaves any active group.
    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.elements);
        if done {
            self.reset_selection();
        }
        done
    }

    /// Redo the newest undone change. Clears selection and leaves any active group.
    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.elements);
        if done {
            self.reset_selection();
        }
        done
    }

    fn reset_selection(&mut self) {
        // entries apply element by element, so stacking is settled once at the end
        self.elements.restack();
        for element in self.elements.iter_mut() {
            element.selected = false;
        }
        self.active_group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementDefaults, ElementType};

    fn rect_with_order(order: i64) -> Element {
        let mut element = Element::new(
            ElementKind::initialize(ElementType::Rectangle, &ElementDefaults::default()),
            Frame::new(0.0, 0.0, 10.0, 10.0),
        );
        element.order = order;
        element
    }

    #[test]
    fn test_insert_keeps_front_to_back() {
        let mut list = ElementList::new();
        list.insert(rect_with_order(1));
        list.insert(rect_with_order(3));
        list.insert(rect_with_order(2));
        let orders: Vec<i64> = list.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![3, 2, 1]);
        assert_eq!(list.next_order(), 4);
    }

    #[test]
    fn test_topmost_wins_hit_test() {
        let mut list = ElementList::new();
        let bottom = rect_with_order(0);
        let top = rect_with_order(1);
        let top_id = top.id();
        list.insert(bottom);
        list.insert(top);
        assert_eq!(list.element_at(Point::new(5.0, 5.0), 0.0).map(Element::id), Some(top_id));
    }

    #[test]
    fn test_replace_restacks() {
        let mut list = ElementList::new();
        let a = rect_with_order(0);
        let b = rect_with_order(1);
        let a_id = a.id();
        list.insert(a.clone());
        list.insert(b);
        let mut raised = a;
        raised.order = 5;
        assert!(list.replace(raised));
        assert_eq!(list.iter().next().map(Element::id), Some(a_id));
    }

    #[test]
    fn test_undo_clears_selection_and_group() {
        let mut page = Page::new("Page 1");
        let mut element = rect_with_order(0);
        page.elements.insert(element.clone());
        page.record(HistoryEntry::create(&[element.clone()]));
        element.selected = true;
        page.elements.replace(element.clone());
        page.active_group = Some(Uuid::new_v4());

        assert!(page.undo());
        assert!(page.elements.is_empty());
        assert!(page.redo());
        assert!(!page.elements.get(element.id()).unwrap().selected);
        assert!(page.active_group.is_none());
    }
}
