//! Pointer gestures.
//!
//! Every gesture that moves existing elements keeps snapshots from when it
//! started and rebuilds the live elements from them on each move, so the
//! result depends only on the latest pointer position and the history entry
//! written on release spans the whole gesture.

use super::effect::{Effect, Effects};
use super::state::{GestureState, Tool};
use super::Editor;
use crate::elements::{
    elements_bounds, ArrowBinding, Element, ElementId, ElementKind, ElementType, Frame,
    HookContext,
};
use crate::handles::{self, HandleKind, HANDLE_HIT_TOLERANCE};
use crate::history::HistoryEntry;
use crate::metrics::TextMetrics;
use crate::page::Page;
use crate::selection;
use crate::snap::{snap_angle, SnapAxis, SnapEngine};
use kurbo::{Point, Vec2};

/// Zoom factor per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Element hit tolerance in client pixels.
const HIT_TOLERANCE: f64 = 4.0;

fn guides_changed(fx: &mut Effects, snap: &SnapEngine) {
    fx.push(Effect::GuidesChanged {
        guides: snap.guides().to_vec(),
    });
}

fn clear_guides(fx: &mut Effects) {
    fx.push(Effect::GuidesChanged { guides: Vec::new() });
}

/// The single selected, unlocked element and the handle under `point`.
fn handle_under(page: &Page, point: Point, tolerance: f64) -> Option<(ElementId, HandleKind)> {
    let mut selected = page.elements.iter().filter(|e| e.selected);
    let element = selected.next()?;
    if selected.next().is_some() || element.locked {
        return None;
    }
    handles::hit_test_handles(&element.handles(), point, tolerance).map(|h| (element.id(), h))
}

/// Attach the given ends of arrow `id` to the topmost element under them,
/// or detach them when nothing is there.
pub(super) fn bind_arrow_endpoints(page: &mut Page, id: ElementId, ends: &[HandleKind]) {
    let Some(ElementKind::Arrow(arrow)) = page.elements.get(id).map(|e| &e.kind) else {
        return;
    };
    let bindings: Vec<(HandleKind, Option<ArrowBinding>)> = ends
        .iter()
        .map(|&end| {
            let point = if end == HandleKind::Start {
                arrow.start
            } else {
                arrow.end
            };
            let target = page
                .elements
                .iter()
                .filter(|e| e.id() != id && !e.creating && !e.erased)
                .filter(|e| e.element_type() != ElementType::Arrow)
                .find(|e| e.bounds().contains(point))
                .map(|e| ArrowBinding::new(e.id(), e.bounds(), point));
            (end, target)
        })
        .collect();

    if let Some(ElementKind::Arrow(arrow)) = page.elements.get_mut(id).map(|e| &mut e.kind) {
        for (end, binding) in bindings {
            match end {
                HandleKind::Start => arrow.start_binding = binding,
                _ => arrow.end_binding = binding,
            }
        }
    }
}

impl Editor {
    pub(super) fn pointer_down(
        &mut self,
        client: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        self.last_client = client;
        self.commit_text(fx);
        if !self.gesture.is_idle() {
            log::debug!("Ignoring pointer down during {}", self.gesture.name());
            return;
        }
        let point = self.canvas_point(client);
        match (self.tool, self.tool.element_type()) {
            (Tool::Pan, _) => {
                self.gesture = GestureState::Panning { last: client };
                fx.push(Effect::CapturePointer);
            }
            (Tool::Erase, _) => {
                self.gesture = GestureState::Erasing;
                fx.push(Effect::CapturePointer);
                self.erase_at(point);
            }
            (_, Some(element_type)) => self.start_creating(element_type, point, metrics, fx),
            (_, None) => self.select_down(point, fx),
        }
    }

    fn start_creating(
        &mut self,
        element_type: ElementType,
        point: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        let ctx = HookContext::new(metrics, &self.settings);
        let page = self.document.page_mut();
        let left_group = selection::exit_group(page);
        fx.selection_if(selection::clear(page) || left_group);

        let mut snap = if element_type == ElementType::FreehandDraw {
            SnapEngine::disabled()
        } else {
            SnapEngine::build(page.elements.iter(), &self.settings)
        };
        let start = snap.snap_point(point).point;

        let mut element = Element::new(
            ElementKind::initialize(element_type, &self.defaults),
            Frame::at(start),
        );
        element.creating = true;
        element.order = page.elements.next_order();
        element.create_start(start, &ctx);
        let id = element.id();
        page.elements.insert(element);
        log::debug!("Creating {:?} {}", element_type, id);

        fx.push(Effect::CapturePointer);
        guides_changed(fx, &snap);
        self.gesture = GestureState::Creating { id, snap };
    }

    fn select_down(&mut self, point: Point, fx: &mut Effects) {
        let shift = self.modifiers.shift;
        let page = self.document.page_mut();

        let handle_tolerance = page.camera.client_distance(HANDLE_HIT_TOLERANCE);
        if let Some((id, handle)) = handle_under(page, point, handle_tolerance) {
            let Some(snapshot) = page.elements.get(id).cloned() else {
                return;
            };
            let center = snapshot.frame.center();
            let start_angle = (point.y - center.y).atan2(point.x - center.x);
            let snap = SnapEngine::build(page.elements.iter(), &self.settings);
            log::debug!("Resizing {} by {:?}", id, handle);
            fx.push(Effect::CapturePointer);
            self.gesture = GestureState::Resizing {
                id,
                handle,
                snapshot,
                snap,
                start_angle,
            };
            return;
        }

        let tolerance = page.camera.client_distance(HIT_TOLERANCE);
        let hit = page
            .elements
            .element_at(point, tolerance)
            .map(|e| (e.id(), e.group));
        match hit {
            Some((id, group)) => {
                if page.active_group.is_some() && page.active_group != group {
                    fx.selection_if(selection::exit_group(page));
                }
                let selected = page.elements.get(id).is_some_and(|e| e.selected);
                if shift {
                    fx.selection_if(selection::toggle_element(page, id));
                } else if !selected {
                    fx.selection_if(selection::select_element(page, id));
                }
                self.gesture = GestureState::Pointing {
                    origin: point,
                    target: id,
                };
            }
            None => {
                if !shift {
                    let left_group = selection::exit_group(page);
                    fx.selection_if(selection::clear(page) || left_group);
                }
                self.gesture = GestureState::Brushing {
                    origin: point,
                    current: point,
                };
            }
        }
        fx.push(Effect::CapturePointer);
    }

    pub(super) fn pointer_move(
        &mut self,
        client: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        self.last_client = client;
        let point = self.canvas_point(client);
        let next = match std::mem::take(&mut self.gesture) {
            GestureState::Pointing { origin, target } => {
                self.pointing_move(origin, target, point, fx)
            }
            GestureState::Translating {
                origin,
                snapshots,
                mut snap,
            } => {
                self.translate_to(&snapshots, &mut snap, point - origin, fx);
                GestureState::Translating {
                    origin,
                    snapshots,
                    snap,
                }
            }
            GestureState::Resizing {
                id,
                handle,
                snapshot,
                mut snap,
                start_angle,
            } => {
                self.resize_to(&snapshot, handle, &mut snap, start_angle, point, metrics, fx);
                GestureState::Resizing {
                    id,
                    handle,
                    snapshot,
                    snap,
                    start_angle,
                }
            }
            GestureState::Brushing { origin, .. } => {
                fx.push(Effect::MarqueeChanged {
                    area: Some(Frame::from_points(origin, point).normalized()),
                });
                GestureState::Brushing {
                    origin,
                    current: point,
                }
            }
            GestureState::Erasing => {
                self.erase_at(point);
                GestureState::Erasing
            }
            GestureState::Creating { id, mut snap } => {
                let target = snap.snap_point(point).point;
                let ctx = HookContext::new(metrics, &self.settings);
                if let Some(element) = self.document.page_mut().elements.get_mut(id) {
                    element.create_move(target, &ctx);
                }
                guides_changed(fx, &snap);
                GestureState::Creating { id, snap }
            }
            GestureState::Panning { last } => {
                self.document.page_mut().camera.pan(client - last);
                fx.push(Effect::ViewChanged);
                GestureState::Panning { last: client }
            }
            other => other,
        };
        self.gesture = next;
    }

    fn pointing_move(
        &mut self,
        origin: Point,
        target: ElementId,
        point: Point,
        fx: &mut Effects,
    ) -> GestureState {
        let page = self.document.page();
        let travelled = (point - origin).hypot() * page.camera.zoom;
        let movable = page
            .elements
            .get(target)
            .is_some_and(|e| e.selected && !e.locked);
        if travelled <= self.settings.drag_threshold || !movable {
            return GestureState::Pointing { origin, target };
        }

        let snapshots: Vec<Element> = page
            .elements
            .paint_order()
            .filter(|e| e.selected && !e.locked)
            .cloned()
            .collect();
        let mut snap = SnapEngine::build(page.elements.iter(), &self.settings);
        log::debug!("Translating {} element(s)", snapshots.len());
        self.translate_to(&snapshots, &mut snap, point - origin, fx);
        GestureState::Translating {
            origin,
            snapshots,
            snap,
        }
    }

    fn translate_to(
        &mut self,
        snapshots: &[Element],
        snap: &mut SnapEngine,
        delta: Vec2,
        fx: &mut Effects,
    ) {
        let delta = match elements_bounds(snapshots) {
            Some(bounds) => snap.snap_translation(&bounds, delta),
            None => delta,
        };
        let page = self.document.page_mut();
        for snapshot in snapshots {
            let mut moved = snapshot.clone();
            moved.drag(delta);
            page.elements.replace(moved);
        }
        guides_changed(fx, snap);
    }

    #[allow(clippy::too_many_arguments)]
    fn resize_to(
        &mut self,
        snapshot: &Element,
        handle: HandleKind,
        snap: &mut SnapEngine,
        start_angle: f64,
        point: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        let mut working = snapshot.clone();
        if handle == HandleKind::Rotate {
            let center = snapshot.frame.center();
            let mut angle = (point.y - center.y).atan2(point.x - center.x) - start_angle;
            if self.modifiers.shift {
                let total = (snapshot.rotation + angle).to_degrees();
                angle = snap_angle(total, self.settings.angle_snap_degrees).to_radians()
                    - snapshot.rotation;
            }
            working.rotate_by(angle);
        } else {
            let mut local = snapshot.to_local(point);
            snap.clear_guides();
            if snapshot.rotation == 0.0 {
                if handle.moves_x() {
                    local.x = snap.snap_coordinate(SnapAxis::X, local.x);
                }
                if handle.moves_y() {
                    local.y = snap.snap_coordinate(SnapAxis::Y, local.y);
                }
            }
            let ctx = HookContext::new(metrics, &self.settings);
            working.resize_start(handle);
            working.resize(handle, local, &ctx);
        }
        self.document.page_mut().elements.replace(working);
        guides_changed(fx, snap);
    }

    fn erase_at(&mut self, point: Point) {
        for element in self.document.page_mut().elements.iter_mut() {
            if !element.locked && !element.creating && element.bounds().contains(point) {
                element.erased = true;
            }
        }
    }

    pub(super) fn pointer_up(
        &mut self,
        client: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        self.last_client = client;
        if self.gesture.is_idle() || self.gesture.is_text_editing() {
            return;
        }
        let point = self.canvas_point(client);
        let gesture = std::mem::take(&mut self.gesture);
        fx.push(Effect::ReleasePointer);
        match gesture {
            GestureState::Pointing { target, .. } => self.pointing_up(target, fx),
            GestureState::Translating { snapshots, .. } => {
                self.finish_translate(&snapshots, fx);
                clear_guides(fx);
            }
            GestureState::Resizing {
                id,
                handle,
                snapshot,
                ..
            } => {
                self.finish_resize(id, handle, &snapshot, metrics, fx);
                clear_guides(fx);
            }
            GestureState::Brushing { origin, .. } => {
                let area = Frame::from_points(origin, point).normalized();
                let additive = self.modifiers.shift;
                let page = self.document.page_mut();
                fx.selection_if(selection::select_in_area(page, &area, additive));
                fx.push(Effect::MarqueeChanged { area: None });
            }
            GestureState::Erasing => self.finish_erase(fx),
            GestureState::Creating { id, .. } => {
                self.finish_create(id, metrics, fx);
                clear_guides(fx);
            }
            GestureState::Panning { .. } | GestureState::Idle | GestureState::TextEditing { .. } => {}
        }
    }

    /// A press that never became a drag narrows a multi-selection to the
    /// clicked element (and its group).
    fn pointing_up(&mut self, target: ElementId, fx: &mut Effects) {
        if self.modifiers.shift {
            return;
        }
        let page = self.document.page_mut();
        if page.elements.get(target).is_some_and(|e| e.selected) {
            fx.selection_if(selection::select_element(page, target));
        }
    }

    fn finish_translate(&mut self, snapshots: &[Element], fx: &mut Effects) {
        let moved: Vec<ElementId> = snapshots.iter().map(Element::id).collect();
        let page = self.document.page_mut();
        let mut pairs = Vec::new();
        for before in snapshots {
            let Some(element) = page.elements.get_mut(before.id()) else {
                continue;
            };
            if element.frame == before.frame {
                continue;
            }
            // an arrow dragged away from a target that stayed put lets go of it
            if let ElementKind::Arrow(arrow) = &mut element.kind {
                for binding in [&mut arrow.start_binding, &mut arrow.end_binding] {
                    if binding.is_some_and(|b| !moved.contains(&b.element)) {
                        *binding = None;
                    }
                }
            }
            pairs.push((before.clone(), element.clone()));
        }
        self.commit(HistoryEntry::update(pairs), fx);
    }

    fn finish_resize(
        &mut self,
        id: ElementId,
        handle: HandleKind,
        snapshot: &Element,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        let ctx = HookContext::new(metrics, &self.settings);
        let page = self.document.page_mut();
        let Some(element) = page.elements.get_mut(id) else {
            return;
        };
        element.resize_end(&ctx);
        match handle {
            HandleKind::Start | HandleKind::End => bind_arrow_endpoints(page, id, &[handle]),
            _ => {}
        }
        let Some(after) = page.elements.get(id).cloned() else {
            return;
        };
        if after.same_content(snapshot) {
            return;
        }
        self.commit(HistoryEntry::update([(snapshot.clone(), after)]), fx);
    }

    fn finish_erase(&mut self, fx: &mut Effects) {
        let page = self.document.page_mut();
        let erased: Vec<ElementId> = page
            .elements
            .iter()
            .filter(|e| e.erased)
            .map(Element::id)
            .collect();
        let removed: Vec<Element> = erased
            .into_iter()
            .filter_map(|id| page.elements.remove(id))
            .collect();
        fx.selection_if(removed.iter().any(|e| e.selected));
        self.commit(HistoryEntry::remove(&removed), fx);
        if !self.settings.tool_lock {
            let previous = self.previous_tool;
            self.set_tool(previous, fx);
        }
    }

    fn finish_create(&mut self, id: ElementId, metrics: &dyn TextMetrics, fx: &mut Effects) {
        let ctx = HookContext::new(metrics, &self.settings);
        let tool_lock = self.settings.tool_lock;
        let page = self.document.page_mut();
        let Some(element) = page.elements.get_mut(id) else {
            return;
        };
        element.create_end(&ctx);
        if element.is_degenerate() {
            page.elements.remove(id);
            log::debug!("Discarded degenerate element {id}");
            return;
        }
        element.selected = !tool_lock;
        let is_text = element.element_type() == ElementType::Text;
        bind_arrow_endpoints(page, id, &[HandleKind::Start, HandleKind::End]);
        let Some(created) = page.elements.get(id).cloned() else {
            return;
        };

        fx.selection_if(created.selected);
        // new text is recorded once its edit commits with content
        if !is_text {
            self.commit(HistoryEntry::create(std::slice::from_ref(&created)), fx);
        }
        if !tool_lock {
            self.set_tool(Tool::Select, fx);
        }
        if is_text {
            self.begin_text_edit(id, true, fx);
        }
    }

    /// Abort the gesture in progress and put back whatever it changed.
    pub(super) fn cancel_gesture(&mut self, fx: &mut Effects) {
        if self.gesture.is_idle() || self.gesture.is_text_editing() {
            return;
        }
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("Cancelled {}", gesture.name());
        let page = self.document.page_mut();
        match gesture {
            GestureState::Creating { id, .. } => {
                page.elements.remove(id);
                clear_guides(fx);
            }
            GestureState::Translating { snapshots, .. } => {
                for snapshot in snapshots {
                    page.elements.replace(snapshot);
                }
                clear_guides(fx);
            }
            GestureState::Resizing { snapshot, .. } => {
                page.elements.replace(snapshot);
                clear_guides(fx);
            }
            GestureState::Brushing { .. } => fx.push(Effect::MarqueeChanged { area: None }),
            GestureState::Erasing => {
                for element in page.elements.iter_mut() {
                    element.erased = false;
                }
            }
            GestureState::Pointing { .. }
            | GestureState::Panning { .. }
            | GestureState::Idle
            | GestureState::TextEditing { .. } => {}
        }
        fx.push(Effect::ReleasePointer);
    }

    pub(super) fn double_click(
        &mut self,
        client: Point,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        self.last_client = client;
        self.commit_text(fx);
        if self.tool != Tool::Select || !self.gesture.is_idle() {
            return;
        }
        let point = self.canvas_point(client);
        let page = self.document.page_mut();
        let tolerance = page.camera.client_distance(HIT_TOLERANCE);
        let hit = page
            .elements
            .element_at(point, tolerance)
            .map(|e| (e.id(), e.group, !e.locked && e.is_text_capable()));
        if page.active_group.is_some() && hit.and_then(|h| h.1) != page.active_group {
            fx.selection_if(selection::exit_group(page));
        }
        let in_group = page.active_group.is_some();

        match hit {
            None => self.create_text_at(point, metrics, fx),
            Some((id, Some(_), _)) if !in_group => {
                fx.selection_if(selection::enter_group(self.document.page_mut(), id));
            }
            Some((id, _, true)) => self.begin_text_edit(id, false, fx),
            Some(_) => {}
        }
    }

    fn create_text_at(&mut self, point: Point, metrics: &dyn TextMetrics, fx: &mut Effects) {
        let ctx = HookContext::new(metrics, &self.settings);
        let page = self.document.page_mut();
        fx.selection_if(selection::clear(page));
        let mut element = Element::new(
            ElementKind::initialize(ElementType::Text, &self.defaults),
            Frame::at(point),
        );
        element.order = page.elements.next_order();
        element.create_start(point, &ctx);
        element.create_end(&ctx);
        element.selected = true;
        let id = element.id();
        page.elements.insert(element);
        self.begin_text_edit(id, true, fx);
    }

    pub(super) fn wheel(&mut self, client: Point, delta: Vec2, fx: &mut Effects) {
        let zoom = self.modifiers.command();
        let camera = &mut self.document.page_mut().camera;
        if zoom {
            let factor = if delta.y < 0.0 {
                ZOOM_STEP
            } else if delta.y > 0.0 {
                1.0 / ZOOM_STEP
            } else {
                return;
            };
            camera.zoom_at(client, factor);
        } else {
            camera.pan(-delta);
        }
        fx.push(Effect::ViewChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{Command, Effect, Editor, GestureState, InputEvent, Key, Modifiers, Tool};
    use crate::elements::{ElementKind, ElementType, Frame};
    use crate::history::EntryKind;
    use kurbo::{Point, Vec2};

    #[test]
    fn test_translate_many_moves_one_entry() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        down(&mut editor, 20.0, 20.0);
        for step in 1..=10 {
            move_to(&mut editor, 20.0 + step as f64 * 7.0, 20.0 + step as f64 * 3.0);
        }
        up(&mut editor, 90.0, 50.0);

        assert_eq!(element(&editor, id).frame, Frame::new(70.0, 30.0, 110.0, 70.0));
        assert_eq!(history_len(&editor), 1);
        command(&mut editor, Command::Undo);
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_small_motion_is_a_click() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        down(&mut editor, 20.0, 20.0);
        move_to(&mut editor, 21.0, 21.0);
        up(&mut editor, 21.0, 21.0);
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 40.0, 40.0));
        assert!(element(&editor, id).selected);
        assert_eq!(history_len(&editor), 0);
    }

    #[test]
    fn test_translate_snaps_to_nearest_edge() {
        let mut editor = Editor::new();
        add_rect(&mut editor, 100.0, 0.0, 150.0, 40.0);
        add_rect(&mut editor, 102.0, 100.0, 152.0, 140.0);
        let moving = add_rect(&mut editor, 300.0, 300.0, 340.0, 340.0);

        down(&mut editor, 320.0, 320.0);
        let effects = move_to(&mut editor, 118.0, 320.0);
        let guides = effects.iter().find_map(|e| match e {
            Effect::GuidesChanged { guides } => Some(guides.clone()),
            _ => None,
        });
        assert!(guides.is_some_and(|g| g.iter().any(|edge| edge.position == 100.0)));
        let effects = up(&mut editor, 118.0, 320.0);
        assert!(effects.contains(&Effect::GuidesChanged { guides: Vec::new() }));

        assert_eq!(element(&editor, moving).frame.x1, 100.0);
        assert_eq!(element(&editor, moving).frame.x2, 140.0);
    }

    #[test]
    fn test_locked_element_does_not_move() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        editor.document_mut().page_mut().elements.get_mut(id).unwrap().locked = true;
        drag(&mut editor, (20.0, 20.0), (80.0, 80.0));
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(history_len(&editor), 0);
    }

    #[test]
    fn test_locked_member_stays_while_selection_moves() {
        let mut editor = Editor::new();
        let free = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let locked = add_rect(&mut editor, 100.0, 0.0, 140.0, 40.0);
        editor.document_mut().page_mut().elements.get_mut(locked).unwrap().locked = true;
        command(&mut editor, Command::SelectAll);
        drag(&mut editor, (20.0, 20.0), (20.0, 60.0));

        assert_eq!(element(&editor, free).frame, Frame::new(0.0, 40.0, 40.0, 80.0));
        assert_eq!(element(&editor, locked).frame, Frame::new(100.0, 0.0, 140.0, 40.0));
        assert!(element(&editor, locked).selected);
    }

    #[test]
    fn test_corner_resize() {
        let mut editor = Editor::new();
        editor.settings.snap_to_elements = false;
        let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);
        down(&mut editor, 50.0, 50.0);
        up(&mut editor, 50.0, 50.0);

        drag(&mut editor, (100.0, 100.0), (150.0, 130.0));
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 150.0, 130.0));
        assert_eq!(history_len(&editor), 1);
        assert_eq!(editor.page().history.tip().unwrap().kind, EntryKind::Update);
    }

    #[test]
    fn test_resize_past_anchor_stays_normalized() {
        let mut editor = Editor::new();
        editor.settings.snap_to_elements = false;
        let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);
        down(&mut editor, 50.0, 50.0);
        up(&mut editor, 50.0, 50.0);

        drag(&mut editor, (100.0, 100.0), (-20.0, -40.0));
        let frame = element(&editor, id).frame;
        assert!(frame.is_normalized());
        assert_eq!(frame, Frame::new(-20.0, -40.0, 0.0, 0.0));
    }

    #[test]
    fn test_shift_rotation_snaps_to_increment() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);
        down(&mut editor, 50.0, 50.0);
        up(&mut editor, 50.0, 50.0);

        let rotate = element(&editor, id)
            .handles()
            .into_iter()
            .find(|h| h.kind == crate::handles::HandleKind::Rotate)
            .unwrap()
            .position;
        down(&mut editor, rotate.x, rotate.y);
        // roughly 40 degrees clockwise around the center
        move_with(&mut editor, 50.0 + 64.3, 50.0 - 76.6, Modifiers::SHIFT);
        up_with(&mut editor, 50.0 + 64.3, 50.0 - 76.6, Modifiers::SHIFT);

        let degrees = element(&editor, id).rotation.to_degrees();
        assert!((degrees - 45.0).abs() < 1e-6, "rotation was {degrees}");
        assert_eq!(history_len(&editor), 1);
    }

    #[test]
    fn test_marquee_selects_enclosed_and_expands_groups() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 10.0, 10.0, 40.0, 40.0);
        let b = add_rect(&mut editor, 80.0, 10.0, 140.0, 40.0);
        let c = add_rect(&mut editor, 300.0, 300.0, 340.0, 340.0);
        let group = uuid::Uuid::new_v4();
        for id in [a, c] {
            editor.document_mut().page_mut().elements.get_mut(id).unwrap().group = Some(group);
        }

        let effects = down(&mut editor, 0.0, 0.0);
        assert!(effects.contains(&Effect::CapturePointer));
        let effects = move_to(&mut editor, 100.0, 60.0);
        assert!(effects.contains(&Effect::MarqueeChanged {
            area: Some(Frame::new(0.0, 0.0, 100.0, 60.0))
        }));
        let effects = up(&mut editor, 100.0, 60.0);
        assert!(effects.contains(&Effect::MarqueeChanged { area: None }));

        assert!(element(&editor, a).selected);
        assert!(!element(&editor, b).selected);
        assert!(element(&editor, c).selected);
    }

    #[test]
    fn test_clicking_group_member_selects_group() {
        let mut editor = Editor::new();
        let ids: Vec<_> = (0..3)
            .map(|i| add_rect(&mut editor, i as f64 * 50.0, 0.0, i as f64 * 50.0 + 40.0, 40.0))
            .collect();
        let group = uuid::Uuid::new_v4();
        for id in &ids {
            editor.document_mut().page_mut().elements.get_mut(*id).unwrap().group = Some(group);
        }
        down(&mut editor, 20.0, 20.0);
        up(&mut editor, 20.0, 20.0);
        assert!(ids.iter().all(|id| element(&editor, *id).selected));
    }

    #[test]
    fn test_erase_removes_in_one_entry_and_restores_tool() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let b = add_rect(&mut editor, 100.0, 0.0, 140.0, 40.0);
        let keep = add_rect(&mut editor, 0.0, 200.0, 40.0, 240.0);
        set_tool(&mut editor, Tool::Erase);

        down(&mut editor, 20.0, 20.0);
        move_to(&mut editor, 120.0, 20.0);
        assert!(element(&editor, a).erased && element(&editor, b).erased);
        up(&mut editor, 120.0, 20.0);

        assert_eq!(editor.page().elements.ids(), vec![keep]);
        assert_eq!(history_len(&editor), 1);
        assert_eq!(editor.page().history.tip().unwrap().kind, EntryKind::Remove);
        assert_eq!(editor.tool(), Tool::Select);

        command(&mut editor, Command::Undo);
        assert_eq!(editor.page().elements.len(), 3);
    }

    #[test]
    fn test_escape_during_erase_keeps_elements() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        set_tool(&mut editor, Tool::Erase);
        down(&mut editor, 20.0, 20.0);
        key(&mut editor, Key::Escape, Modifiers::NONE);
        up(&mut editor, 20.0, 20.0);
        assert!(!element(&editor, a).erased);
        assert_eq!(history_len(&editor), 0);
    }

    #[test]
    fn test_escape_restores_translated_elements() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        down(&mut editor, 20.0, 20.0);
        move_to(&mut editor, 80.0, 80.0);
        key(&mut editor, Key::Escape, Modifiers::NONE);
        assert!(editor.gesture().is_idle());
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 40.0, 40.0));
        up(&mut editor, 80.0, 80.0);
        assert_eq!(history_len(&editor), 0);
    }

    #[test]
    fn test_arrow_binds_to_elements_under_endpoints() {
        let mut editor = Editor::new();
        let from = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let to = add_rect(&mut editor, 200.0, 0.0, 240.0, 40.0);
        set_tool(&mut editor, Tool::Arrow);
        drag(&mut editor, (20.0, 20.0), (220.0, 20.0));

        let arrow = editor
            .page()
            .elements
            .iter()
            .find_map(|e| match &e.kind {
                ElementKind::Arrow(data) => Some(data.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(arrow.start_binding.map(|b| b.element), Some(from));
        assert_eq!(arrow.end_binding.map(|b| b.element), Some(to));
    }

    #[test]
    fn test_bound_arrow_follows_moved_target() {
        let mut editor = Editor::new();
        editor.settings.snap_to_elements = false;
        add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let to = add_rect(&mut editor, 200.0, 0.0, 240.0, 40.0);
        set_tool(&mut editor, Tool::Arrow);
        drag(&mut editor, (20.0, 20.0), (220.0, 20.0));
        let arrow = editor
            .page()
            .elements
            .iter()
            .find(|e| e.element_type() == ElementType::Arrow)
            .map(|e| e.id())
            .unwrap();
        key(&mut editor, Key::Escape, Modifiers::NONE);

        drag(&mut editor, (230.0, 35.0), (230.0, 235.0));
        assert_eq!(element(&editor, to).frame, Frame::new(200.0, 200.0, 240.0, 240.0));
        assert_eq!(element(&editor, arrow).frame, Frame::new(20.0, 20.0, 220.0, 220.0));
        assert_eq!(history_len(&editor), 2);

        // the arrow is picked where it is drawn now
        key(&mut editor, Key::Escape, Modifiers::NONE);
        down(&mut editor, 120.0, 120.0);
        up(&mut editor, 120.0, 120.0);
        assert!(element(&editor, arrow).selected);

        command(&mut editor, Command::Undo);
        assert_eq!(element(&editor, to).frame, Frame::new(200.0, 0.0, 240.0, 40.0));
        assert_eq!(element(&editor, arrow).frame, Frame::new(20.0, 20.0, 220.0, 20.0));
    }

    #[test]
    fn test_double_click_enters_group() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let b = add_rect(&mut editor, 100.0, 0.0, 140.0, 40.0);
        let group = uuid::Uuid::new_v4();
        for id in [a, b] {
            editor.document_mut().page_mut().elements.get_mut(id).unwrap().group = Some(group);
        }
        editor.handle_event(
            InputEvent::DoubleClick {
                client: Point::new(20.0, 20.0),
                modifiers: Modifiers::NONE,
            },
            &METRICS,
        );
        assert_eq!(editor.page().active_group, Some(group));
        assert!(element(&editor, a).selected);
        assert!(!element(&editor, b).selected);

        key(&mut editor, Key::Escape, Modifiers::NONE);
        assert_eq!(editor.page().active_group, None);
        assert!(!element(&editor, a).selected);
    }

    #[test]
    fn test_pan_tool_and_wheel_move_camera() {
        let mut editor = Editor::new();
        set_tool(&mut editor, Tool::Pan);
        down(&mut editor, 100.0, 100.0);
        let effects = move_to(&mut editor, 130.0, 90.0);
        assert!(effects.contains(&Effect::ViewChanged));
        up(&mut editor, 130.0, 90.0);
        assert_eq!(editor.page().camera.translate, Vec2::new(30.0, -10.0));

        editor.handle_event(
            InputEvent::Wheel {
                client: Point::ZERO,
                delta: Vec2::new(0.0, -1.0),
                modifiers: Modifiers {
                    ctrl: true,
                    ..Modifiers::NONE
                },
            },
            &METRICS,
        );
        assert!((editor.page().camera.zoom - super::ZOOM_STEP).abs() < 1e-9);
        assert!(matches!(editor.gesture(), GestureState::Idle));
    }
}
