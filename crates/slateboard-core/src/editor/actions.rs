//! Commands and clipboard handling.

use super::effect::{Effect, Effects};
use super::event::{ClipboardPayload, Command};
use super::Editor;
use crate::document::AssetRecord;
use crate::elements::{
    duplicate_elements, elements_bounds, Element, ElementId, ElementKind, ElementType, Frame,
    HookContext, ImageData, Property, PropertyValue,
};
use crate::error::ClipboardError;
use crate::history::HistoryEntry;
use crate::metrics::TextMetrics;
use crate::selection;
use kurbo::{Point, Size, Vec2};

/// Margin around the content for zoom-to-fit, in client pixels.
const FIT_PADDING: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restack {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

impl Editor {
    pub(super) fn run_command(&mut self, command: Command, metrics: &dyn TextMetrics, fx: &mut Effects) {
        log::debug!("Command {:?}", command);
        match command {
            Command::SetGridEnabled { enabled } => {
                self.settings.grid_enabled = enabled;
                return;
            }
            Command::ZoomToFit { viewport } => {
                self.zoom_to_fit(viewport, fx);
                return;
            }
            _ => {}
        }

        self.commit_text(fx);
        if !self.gesture.is_idle() {
            log::debug!("Ignoring command during {}", self.gesture.name());
            return;
        }
        match command {
            Command::Undo => self.undo(fx),
            Command::Redo => self.redo(fx),
            Command::SelectAll => fx.selection_if(selection::select_all(self.document.page_mut())),
            Command::Duplicate => self.duplicate(fx),
            Command::Group => {
                let done = selection::group_selection(self.document.page_mut());
                self.after_grouping(done, fx);
            }
            Command::Ungroup => {
                let done = selection::ungroup_selection(self.document.page_mut());
                self.after_grouping(done, fx);
            }
            Command::BringForward => self.restack(Restack::Forward, fx),
            Command::SendBackward => self.restack(Restack::Backward, fx),
            Command::BringToFront => self.restack(Restack::ToFront, fx),
            Command::SendToBack => self.restack(Restack::ToBack, fx),
            Command::SetProperty { property, value } => {
                self.set_property(property, &value, metrics, fx)
            }
            Command::ToggleLock => self.toggle_lock(fx),
            Command::DeleteSelection => self.delete_selection(fx),
            Command::AddPage { title } => {
                self.document.add_page(title);
                self.document.touch();
                fx.document_changed();
                fx.selection_changed();
                fx.push(Effect::ViewChanged);
            }
            Command::SetPage { index } => {
                if index < self.document.pages().len() {
                    self.switch_page(index, fx);
                } else {
                    log::debug!("No page at index {index}");
                }
            }
            Command::SetGridEnabled { .. } | Command::ZoomToFit { .. } => {}
        }
    }

    fn undo(&mut self, fx: &mut Effects) {
        if self.document.page_mut().undo() {
            log::info!("Undo");
            self.document.touch();
            fx.document_changed();
            fx.selection_changed();
        }
    }

    fn redo(&mut self, fx: &mut Effects) {
        if self.document.page_mut().redo() {
            log::info!("Redo");
            self.document.touch();
            fx.document_changed();
            fx.selection_changed();
        }
    }

    /// Grouping records its own history entry on the page.
    fn after_grouping(&mut self, done: bool, fx: &mut Effects) {
        if done {
            self.document.touch();
            fx.document_changed();
            fx.selection_changed();
        }
    }

    fn duplicate(&mut self, fx: &mut Effects) {
        let selected: Vec<Element> = self
            .document
            .page()
            .elements
            .paint_order()
            .filter(|e| e.selected)
            .cloned()
            .collect();
        if selected.is_empty() {
            return;
        }
        let offset = self.settings.grid_size;
        let copies = duplicate_elements(&selected, Vec2::new(offset, offset));
        self.insert_new_elements(copies, fx);
    }

    /// Stack `elements` on top of the page, keeping their relative order,
    /// and make them the selection.
    fn insert_new_elements(&mut self, mut elements: Vec<Element>, fx: &mut Effects) {
        if elements.is_empty() {
            return;
        }
        let page = self.document.page_mut();
        selection::clear(page);
        page.active_group = None;
        elements.sort_by_key(|e| e.order);
        let base = page.elements.next_order();
        for (i, element) in elements.iter_mut().enumerate() {
            element.frame.normalize();
            element.order = base + i as i64;
            element.selected = true;
            page.elements.insert(element.clone());
        }
        fx.selection_changed();
        self.commit(HistoryEntry::create(&elements), fx);
    }

    pub(super) fn delete_selection(&mut self, fx: &mut Effects) {
        let page = self.document.page_mut();
        let ids: Vec<ElementId> = page
            .elements
            .iter()
            .filter(|e| e.selected && !e.locked)
            .map(Element::id)
            .collect();
        let removed: Vec<Element> = ids
            .into_iter()
            .filter_map(|id| page.elements.remove(id))
            .collect();
        if removed.is_empty() {
            return;
        }
        fx.selection_changed();
        self.commit(HistoryEntry::remove(&removed), fx);
    }

    fn restack(&mut self, how: Restack, fx: &mut Effects) {
        let page = self.document.page_mut();
        // back to front
        let mut stack: Vec<(ElementId, bool)> = page
            .elements
            .paint_order()
            .map(|e| (e.id(), e.selected && !e.locked))
            .collect();
        if !stack.iter().any(|&(_, moving)| moving) {
            return;
        }
        match how {
            Restack::ToFront => stack.sort_by_key(|&(_, moving)| moving),
            Restack::ToBack => stack.sort_by_key(|&(_, moving)| !moving),
            Restack::Forward => {
                for i in (0..stack.len().saturating_sub(1)).rev() {
                    if stack[i].1 && !stack[i + 1].1 {
                        stack.swap(i, i + 1);
                    }
                }
            }
            Restack::Backward => {
                for i in 1..stack.len() {
                    if stack[i].1 && !stack[i - 1].1 {
                        stack.swap(i, i - 1);
                    }
                }
            }
        }

        let mut pairs = Vec::new();
        for (order, (id, _)) in stack.into_iter().enumerate() {
            let order = order as i64;
            if let Some(element) = page.elements.get_mut(id) {
                if element.order != order {
                    let before = element.clone();
                    element.order = order;
                    pairs.push((before, element.clone()));
                }
            }
        }
        page.elements.restack();
        self.commit(HistoryEntry::update(pairs), fx);
    }

    /// Apply a property to the selection. Consecutive changes of the same
    /// property on the same elements fold into one history entry.
    fn set_property(
        &mut self,
        property: Property,
        value: &PropertyValue,
        metrics: &dyn TextMetrics,
        fx: &mut Effects,
    ) {
        let ctx = HookContext::new(metrics, &self.settings);
        let page = self.document.page_mut();
        let mut pairs = Vec::new();
        for element in page.elements.iter_mut().filter(|e| e.selected) {
            if element.locked && property != Property::Locked {
                continue;
            }
            let before = element.clone();
            if element.set_property(property, value, &ctx) && !element.same_content(&before) {
                pairs.push((before, element.clone()));
            }
        }
        if pairs.is_empty() {
            log::debug!("{:?} left the selection unchanged", property);
            return;
        }
        self.commit(
            HistoryEntry::update(pairs).coalescing(property.key()),
            fx,
        );
    }

    /// Lock the selection if any of it is unlocked, otherwise unlock it.
    fn toggle_lock(&mut self, fx: &mut Effects) {
        let page = self.document.page_mut();
        let lock = page.elements.iter().filter(|e| e.selected).any(|e| !e.locked);
        let mut pairs = Vec::new();
        for element in page.elements.iter_mut().filter(|e| e.selected && e.locked != lock) {
            let before = element.clone();
            element.locked = lock;
            pairs.push((before, element.clone()));
        }
        self.commit(HistoryEntry::update(pairs), fx);
    }

    fn zoom_to_fit(&mut self, viewport: Size, fx: &mut Effects) {
        let page = self.document.page_mut();
        match elements_bounds(page.elements.as_slice()) {
            Some(bounds) => page.camera.fit_to_bounds(bounds, viewport, FIT_PADDING),
            None => page.camera.reset(),
        }
        fx.push(Effect::ViewChanged);
    }

    pub(super) fn paste(&mut self, payload: ClipboardPayload, metrics: &dyn TextMetrics, fx: &mut Effects) {
        self.commit_text(fx);
        if !self.gesture.is_idle() {
            log::debug!("Ignoring paste during {}", self.gesture.name());
            return;
        }
        let at = self.canvas_point(self.last_client);
        let rejected = match payload {
            ClipboardPayload::Denied => Some(ClipboardError::Denied),
            ClipboardPayload::Unsupported { mime } => Some(ClipboardError::Unsupported(mime)),
            ClipboardPayload::Text { text } if text.trim().is_empty() => Some(ClipboardError::Empty),
            ClipboardPayload::Elements { elements } if elements.is_empty() => {
                Some(ClipboardError::Empty)
            }
            ClipboardPayload::Text { text } => {
                self.paste_text(&text, at, metrics, fx);
                None
            }
            ClipboardPayload::Image { asset } => {
                self.paste_image(asset, at, fx);
                None
            }
            ClipboardPayload::Elements { elements } => {
                self.paste_elements(&elements, at, fx);
                None
            }
        };
        if let Some(reason) = rejected {
            log::warn!("Paste rejected: {reason}");
            fx.push(Effect::PasteRejected { reason });
        }
    }

    fn paste_text(&mut self, text: &str, at: Point, metrics: &dyn TextMetrics, fx: &mut Effects) {
        let ctx = HookContext::new(metrics, &self.settings);
        let mut element = Element::new(
            ElementKind::initialize(ElementType::Text, &self.defaults),
            Frame::at(at),
        );
        element.create_start(at, &ctx);
        element.create_end(&ctx);
        element.set_text_content(text, &ctx);
        self.insert_new_elements(vec![element], fx);
    }

    fn paste_image(&mut self, asset: AssetRecord, at: Point, fx: &mut Effects) {
        let frame = ImageData::frame_for(at, asset.width, asset.height);
        let asset_id = self.document.add_asset(asset);
        let element = Element::new(ElementKind::Image(ImageData::new(asset_id)), frame);
        self.insert_new_elements(vec![element], fx);
    }

    fn paste_elements(&mut self, elements: &[Element], at: Point, fx: &mut Effects) {
        let Some(bounds) = elements_bounds(elements) else {
            return;
        };
        let copies = duplicate_elements(elements, at - bounds.center());
        self.insert_new_elements(copies, fx);
    }
}
