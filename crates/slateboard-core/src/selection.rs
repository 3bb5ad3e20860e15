//! Selection and grouping.
//!
//! Selection is stored on the elements themselves (`Element::selected`).
//! Groups are flat: members share a [`GroupId`]. Selecting any member
//! selects the whole group, unless the user has entered the group (the
//! page's `active_group`), in which case selection is confined to that
//! group's members and acts on them individually.

use crate::elements::{Element, ElementId, Frame, GroupId};
use crate::history::HistoryEntry;
use crate::page::Page;
use uuid::Uuid;

/// Ids of selected elements, front to back.
pub fn selected_ids(page: &Page) -> Vec<ElementId> {
    page.elements
        .iter()
        .filter(|e| e.selected)
        .map(Element::id)
        .collect()
}

pub fn has_selection(page: &Page) -> bool {
    page.elements.iter().any(|e| e.selected)
}

/// Members of `group`, front to back.
pub fn group_members(page: &Page, group: GroupId) -> Vec<ElementId> {
    page.elements
        .iter()
        .filter(|e| e.group == Some(group))
        .map(Element::id)
        .collect()
}

fn selectable(page: &Page, element: &Element) -> bool {
    if element.creating || element.erased {
        return false;
    }
    match page.active_group {
        Some(group) => element.group == Some(group),
        None => true,
    }
}

/// Deselect everything. Returns whether anything changed.
pub fn clear(page: &mut Page) -> bool {
    let mut changed = false;
    for element in page.elements.iter_mut() {
        changed |= element.selected;
        element.selected = false;
    }
    changed
}

/// Replace the selection with exactly `ids` (no group expansion).
pub fn select_only(page: &mut Page, ids: &[ElementId]) -> bool {
    let mut changed = false;
    for element in page.elements.iter_mut() {
        let wanted = ids.contains(&element.id());
        changed |= element.selected != wanted;
        element.selected = wanted;
    }
    changed
}

/// Select every member of any group that has a selected member.
///
/// Does nothing while a group is active.
pub fn expand_groups(page: &mut Page) -> bool {
    if page.active_group.is_some() {
        return false;
    }
    let groups: Vec<GroupId> = page
        .elements
        .iter()
        .filter(|e| e.selected)
        .filter_map(|e| e.group)
        .collect();
    let mut changed = false;
    for element in page.elements.iter_mut() {
        if let Some(group) = element.group {
            if groups.contains(&group) && !element.selected {
                element.selected = true;
                changed = true;
            }
        }
    }
    changed
}

/// Click selection: select `id` alone (plus its group).
pub fn select_element(page: &mut Page, id: ElementId) -> bool {
    let changed = select_only(page, &[id]);
    expand_groups(page) || changed
}

/// Shift-click: add or remove `id` (and, outside an active group, its
/// fellow group members) from the selection.
pub fn toggle_element(page: &mut Page, id: ElementId) -> bool {
    let Some(element) = page.elements.get(id) else {
        return false;
    };
    let now_selected = !element.selected;
    let targets = match (element.group, page.active_group) {
        (Some(group), None) => group_members(page, group),
        _ => vec![id],
    };
    for target in targets {
        if let Some(member) = page.elements.get_mut(target) {
            member.selected = now_selected;
        }
    }
    true
}

/// Marquee selection: select elements lying entirely inside `area`.
pub fn select_in_area(page: &mut Page, area: &Frame, additive: bool) -> bool {
    let hits: Vec<ElementId> = page
        .elements
        .iter()
        .filter(|e| selectable(page, e) && area.contains_frame(&e.frame))
        .map(Element::id)
        .collect();
    let mut changed = false;
    for element in page.elements.iter_mut() {
        let wanted = hits.contains(&element.id()) || (additive && element.selected);
        changed |= element.selected != wanted;
        element.selected = wanted;
    }
    expand_groups(page) || changed
}

/// Select everything selectable on the page.
pub fn select_all(page: &mut Page) -> bool {
    let ids: Vec<ElementId> = page
        .elements
        .iter()
        .filter(|e| selectable(page, e))
        .map(Element::id)
        .collect();
    select_only(page, &ids)
}

/// Enter the group of `id` and select just that member.
pub fn enter_group(page: &mut Page, id: ElementId) -> bool {
    let Some(group) = page.elements.get(id).and_then(|e| e.group) else {
        return false;
    };
    log::debug!("Entering group {group}");
    page.active_group = Some(group);
    select_only(page, &[id]);
    true
}

/// Leave the active group and clear the selection.
pub fn exit_group(page: &mut Page) -> bool {
    if page.active_group.take().is_none() {
        return false;
    }
    log::debug!("Leaving active group");
    clear(page);
    true
}

/// Put the selected elements into one new group. Needs at least two.
pub fn group_selection(page: &mut Page) -> bool {
    let ids = selected_ids(page);
    if ids.len() < 2 {
        return false;
    }
    let group = Uuid::new_v4();
    let mut pairs = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(element) = page.elements.get_mut(*id) {
            let before = element.clone();
            element.group = Some(group);
            pairs.push((before, element.clone()));
        }
    }
    page.record(HistoryEntry::update(pairs));
    log::info!("Grouped {} elements", ids.len());
    true
}

/// Remove the selected elements from their groups.
pub fn ungroup_selection(page: &mut Page) -> bool {
    let mut pairs = Vec::new();
    for id in selected_ids(page) {
        if let Some(element) = page.elements.get_mut(id) {
            if element.group.is_some() {
                let before = element.clone();
                element.group = None;
                pairs.push((before, element.clone()));
            }
        }
    }
    if pairs.is_empty() {
        return false;
    }
    if page
        .active_group
        .is_some_and(|group| group_members(page, group).is_empty())
    {
        page.active_group = None;
    }
    log::info!("Ungrouped {} elements", pairs.len());
    page.record(HistoryEntry::update(pairs));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementDefaults, ElementKind, ElementType};

    fn add_rect(page: &mut Page, x: f64, group: Option<GroupId>) -> ElementId {
        let mut element = Element::new(
            ElementKind::initialize(ElementType::Rectangle, &ElementDefaults::default()),
            Frame::new(x, 0.0, x + 10.0, 10.0),
        );
        element.order = page.elements.next_order();
        element.group = group;
        let id = element.id();
        page.elements.insert(element);
        id
    }

    fn is_selected(page: &Page, id: ElementId) -> bool {
        page.elements.get(id).is_some_and(|e| e.selected)
    }

    #[test]
    fn test_select_member_selects_group() {
        let mut page = Page::new("p");
        let group = Uuid::new_v4();
        let a = add_rect(&mut page, 0.0, Some(group));
        let b = add_rect(&mut page, 20.0, Some(group));
        let c = add_rect(&mut page, 40.0, None);
        select_element(&mut page, a);
        assert!(is_selected(&page, a));
        assert!(is_selected(&page, b));
        assert!(!is_selected(&page, c));
    }

    #[test]
    fn test_active_group_confines_selection() {
        let mut page = Page::new("p");
        let group = Uuid::new_v4();
        let a = add_rect(&mut page, 0.0, Some(group));
        let b = add_rect(&mut page, 20.0, Some(group));
        let c = add_rect(&mut page, 40.0, None);

        assert!(enter_group(&mut page, a));
        assert!(is_selected(&page, a));
        assert!(!is_selected(&page, b));

        select_in_area(&mut page, &Frame::new(-5.0, -5.0, 100.0, 100.0), false);
        assert!(is_selected(&page, a));
        assert!(is_selected(&page, b));
        assert!(!is_selected(&page, c));

        assert!(exit_group(&mut page));
        assert!(selected_ids(&page).is_empty());
        assert!(!exit_group(&mut page));
    }

    #[test]
    fn test_marquee_needs_full_containment() {
        let mut page = Page::new("p");
        let a = add_rect(&mut page, 0.0, None);
        let b = add_rect(&mut page, 20.0, None);
        select_in_area(&mut page, &Frame::new(-1.0, -1.0, 25.0, 11.0), false);
        assert!(is_selected(&page, a));
        assert!(!is_selected(&page, b));
    }

    #[test]
    fn test_marquee_expands_groups() {
        let mut page = Page::new("p");
        let group = Uuid::new_v4();
        let a = add_rect(&mut page, 0.0, Some(group));
        let far = add_rect(&mut page, 500.0, Some(group));
        select_in_area(&mut page, &Frame::new(-1.0, -1.0, 11.0, 11.0), false);
        assert!(is_selected(&page, a));
        assert!(is_selected(&page, far));
    }

    #[test]
    fn test_toggle_group_members_together() {
        let mut page = Page::new("p");
        let group = Uuid::new_v4();
        let a = add_rect(&mut page, 0.0, Some(group));
        let b = add_rect(&mut page, 20.0, Some(group));
        toggle_element(&mut page, a);
        assert!(is_selected(&page, b));
        toggle_element(&mut page, b);
        assert!(!is_selected(&page, a));
    }

    #[test]
    fn test_group_and_ungroup_are_undoable() {
        let mut page = Page::new("p");
        let a = add_rect(&mut page, 0.0, None);
        let b = add_rect(&mut page, 20.0, None);
        select_only(&mut page, &[a, b]);
        assert!(group_selection(&mut page));
        let group = page.elements.get(a).unwrap().group;
        assert!(group.is_some());
        assert_eq!(page.elements.get(b).unwrap().group, group);

        select_only(&mut page, &[a, b]);
        assert!(ungroup_selection(&mut page));
        assert_eq!(page.history.len(), 2);

        page.undo();
        assert_eq!(page.elements.get(a).unwrap().group, group);
        page.undo();
        assert!(page.elements.get(a).unwrap().group.is_none());
    }

    #[test]
    fn test_group_needs_two_elements() {
        let mut page = Page::new("p");
        let a = add_rect(&mut page, 0.0, None);
        select_only(&mut page, &[a]);
        assert!(!group_selection(&mut page));
        assert!(page.history.is_empty());
    }
}
