//! Element definitions for the whiteboard.
//!
//! Every element shares a common envelope ([`Element`]) carrying identity,
//! the bounding [`Frame`], opacity, stacking order, grouping and rotation.
//! Type-specific data lives in [`ElementKind`], and each variant implements
//! [`ElementBehavior`] to decide how its geometry reacts to the gesture
//! lifecycle (creation, drag, resize, rotation and property updates).

mod arrow;
mod frame;
mod freehand;
mod image;
mod note;
mod shape;
mod text;

pub use arrow::{ArrowBinding, ArrowData, ArrowPath, Arrowhead};
pub use frame::Frame;
pub use freehand::FreehandData;
pub use image::{ImageData, MAX_IMAGE_SIZE};
pub use note::{NOTE_SIZE, NoteData, STICKER_SIZE, StickerData};
pub use shape::{ShapeData, ShapeKind};
pub use text::{
    DEFAULT_TEXT_WIDTH, FONT_SIZE_STEP, FontFamily, MAX_FONT_SIZE, MIN_FONT_SIZE, TextData,
    fit_font_size,
};

use crate::handles::{self, Handle, HandleKind};
use crate::metrics::TextMetrics;
use crate::settings::EditorSettings;
use crate::snap::{self, SnapEdge};
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Identifier shared by all members of a group.
pub type GroupId = Uuid;

/// Key of an entry in the document's asset table.
pub type AssetId = String;

/// Widest stroke accepted by property updates.
pub const MAX_STROKE_WIDTH: f64 = 64.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Default sticky-note yellow.
    pub fn note_yellow() -> Self {
        Self::new(255, 236, 153, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            width: 2.0,
        }
    }
}

/// The concrete element types a tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Rectangle,
    Ellipse,
    Diamond,
    Arrow,
    Text,
    FreehandDraw,
    Image,
    Note,
    Sticker,
}

impl ElementType {
    /// Whether elements of this type carry editable text.
    pub fn is_text_capable(self) -> bool {
        matches!(
            self,
            ElementType::Rectangle
                | ElementType::Ellipse
                | ElementType::Diamond
                | ElementType::Text
                | ElementType::Note
        )
    }
}

/// Style defaults applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementDefaults {
    pub stroke: Stroke,
    pub fill: Option<SerializableColor>,
    pub font_size: f64,
    pub font_family: FontFamily,
    pub text_color: SerializableColor,
    pub note_color: SerializableColor,
    pub sticker: String,
    pub start_head: Arrowhead,
    pub end_head: Arrowhead,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self {
            stroke: Stroke::default(),
            fill: None,
            font_size: TextData::DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            text_color: SerializableColor::black(),
            note_color: SerializableColor::note_yellow(),
            sticker: "star".to_string(),
            start_head: Arrowhead::None,
            end_head: Arrowhead::Triangle,
        }
    }
}

/// Element fields that can be changed through property updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Opacity,
    Locked,
    StrokeColor,
    StrokeWidth,
    FillColor,
    FontSize,
    FontFamily,
    TextColor,
    Content,
    StartHead,
    EndHead,
    ShapeKind,
    Sticker,
}

impl Property {
    /// Coalescing key for history entries produced by this property.
    pub fn key(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::Locked => "locked",
            Property::StrokeColor => "strokeColor",
            Property::StrokeWidth => "strokeWidth",
            Property::FillColor => "fillColor",
            Property::FontSize => "fontSize",
            Property::FontFamily => "fontFamily",
            Property::TextColor => "textColor",
            Property::Content => "content",
            Property::StartHead => "startHead",
            Property::EndHead => "endHead",
            Property::ShapeKind => "shapeKind",
            Property::Sticker => "sticker",
        }
    }

    /// Whether changing this property can alter measured text layout.
    pub fn affects_text_layout(self) -> bool {
        matches!(self, Property::Content | Property::FontSize | Property::FontFamily)
    }
}

/// A candidate value for a [`Property`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Color(SerializableColor),
    /// A color that may be cleared, used for fills.
    OptionalColor(Option<SerializableColor>),
    Text(String),
    Font(FontFamily),
    Head(Arrowhead),
    Shape(ShapeKind),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Accepts stroke color and width changes shared by outlined elements.
pub(crate) fn stroke_value_allowed(property: Property, value: &PropertyValue) -> bool {
    match (property, value) {
        (Property::StrokeColor, PropertyValue::Color(_)) => true,
        (Property::StrokeWidth, PropertyValue::Number(w)) => *w > 0.0 && *w <= MAX_STROKE_WIDTH,
        _ => false,
    }
}

pub(crate) fn apply_stroke(stroke: &mut Stroke, property: Property, value: &PropertyValue) -> bool {
    match (property, value) {
        (Property::StrokeColor, PropertyValue::Color(c)) => stroke.color = *c,
        (Property::StrokeWidth, PropertyValue::Number(w)) => stroke.width = *w,
        _ => return false,
    }
    true
}

/// Environment handed to element hooks.
pub struct HookContext<'a> {
    pub metrics: &'a dyn TextMetrics,
    pub settings: &'a EditorSettings,
}

impl<'a> HookContext<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, settings: &'a EditorSettings) -> Self {
        Self { metrics, settings }
    }
}

/// Per-type geometry rules.
///
/// Hooks receive the element's frame separately from the type data so that
/// the envelope stays in one place. Unimplemented hooks fall back to plain
/// box behavior.
pub trait ElementBehavior {
    /// Pointer went down with this element's creation tool.
    fn on_create_start(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        *frame = Frame::at(point);
    }

    /// Pointer moved while the element is being drawn.
    fn on_create_move(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        frame.x2 = point.x;
        frame.y2 = point.y;
    }

    /// Creation finished; the frame must come out normalized.
    fn on_create_end(&mut self, frame: &mut Frame, _ctx: &HookContext<'_>) {
        frame.normalize();
    }

    /// A finished creation that produced nothing worth keeping.
    fn is_degenerate(&self, frame: &Frame) -> bool {
        frame.width() == 0.0 && frame.height() == 0.0
    }

    /// The envelope frame has already been translated by `delta`.
    fn on_drag(&mut self, _delta: Vec2) {}

    fn on_resize_start(&mut self, _frame: &Frame, _handle: HandleKind) {}

    /// Apply a resize from the gesture-start state towards `point`
    /// (in the element's local, unrotated space).
    fn on_resize(
        &mut self,
        frame: &mut Frame,
        handle: HandleKind,
        point: Point,
        _ctx: &HookContext<'_>,
    ) {
        *frame = handles::resize_frame(frame, handle, point);
    }

    fn on_resize_end(&mut self, frame: &mut Frame, _ctx: &HookContext<'_>) {
        frame.normalize();
    }

    /// Recompute derived geometry after properties changed.
    fn on_update(&mut self, _frame: &mut Frame, _changed: &[Property], _ctx: &HookContext<'_>) {}

    fn handles(&self, frame: &Frame, rotation: f64) -> Vec<Handle> {
        handles::box_handles(frame, rotation)
    }

    fn snap_edges(&self, frame: &Frame) -> Vec<SnapEdge> {
        snap::frame_edges(frame)
            .into_iter()
            .map(|mut edge| {
                edge.points = self.snap_points(frame, &edge);
                edge
            })
            .collect()
    }

    /// Reference points lying on one of this element's snap edges.
    fn snap_points(&self, frame: &Frame, edge: &SnapEdge) -> Vec<Point> {
        snap::frame_points_on(frame, edge.axis, edge.position)
    }

    /// Hit test in local space.
    fn hit_test(&self, frame: &Frame, point: Point, tolerance: f64) -> bool {
        frame.rect().inflate(tolerance, tolerance).contains(point)
    }

    /// Type-specific validation for property updates.
    fn is_value_allowed(&self, _property: Property, _value: &PropertyValue) -> bool {
        false
    }

    /// Store an already validated value. Returns false if nothing changed.
    fn apply_property(&mut self, _property: Property, _value: &PropertyValue) -> bool {
        false
    }

    fn text(&self) -> Option<&str> {
        None
    }

    fn set_text(&mut self, _content: &str) -> bool {
        false
    }
}

/// Type-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Shape(ShapeData),
    Arrow(ArrowData),
    Text(TextData),
    FreehandDraw(FreehandData),
    Image(ImageData),
    Note(NoteData),
    Sticker(StickerData),
}

impl ElementKind {
    /// Fresh type data for an element about to be created.
    pub fn initialize(element_type: ElementType, defaults: &ElementDefaults) -> Self {
        match element_type {
            ElementType::Rectangle => ElementKind::Shape(ShapeData::new(ShapeKind::Rectangle, defaults)),
            ElementType::Ellipse => ElementKind::Shape(ShapeData::new(ShapeKind::Ellipse, defaults)),
            ElementType::Diamond => ElementKind::Shape(ShapeData::new(ShapeKind::Diamond, defaults)),
            ElementType::Arrow => ElementKind::Arrow(ArrowData::new(defaults)),
            ElementType::Text => ElementKind::Text(TextData::new(defaults)),
            ElementType::FreehandDraw => ElementKind::FreehandDraw(FreehandData::new(defaults)),
            ElementType::Image => ElementKind::Image(ImageData::default()),
            ElementType::Note => ElementKind::Note(NoteData::new(defaults)),
            ElementType::Sticker => ElementKind::Sticker(StickerData::new(defaults)),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Shape(shape) => match shape.shape {
                ShapeKind::Rectangle => ElementType::Rectangle,
                ShapeKind::Ellipse => ElementType::Ellipse,
                ShapeKind::Diamond => ElementType::Diamond,
            },
            ElementKind::Arrow(_) => ElementType::Arrow,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::FreehandDraw(_) => ElementType::FreehandDraw,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Note(_) => ElementType::Note,
            ElementKind::Sticker(_) => ElementType::Sticker,
        }
    }

    pub fn behavior(&self) -> &dyn ElementBehavior {
        match self {
            ElementKind::Shape(data) => data,
            ElementKind::Arrow(data) => data,
            ElementKind::Text(data) => data,
            ElementKind::FreehandDraw(data) => data,
            ElementKind::Image(data) => data,
            ElementKind::Note(data) => data,
            ElementKind::Sticker(data) => data,
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn ElementBehavior {
        match self {
            ElementKind::Shape(data) => data,
            ElementKind::Arrow(data) => data,
            ElementKind::Text(data) => data,
            ElementKind::FreehandDraw(data) => data,
            ElementKind::Image(data) => data,
            ElementKind::Note(data) => data,
            ElementKind::Sticker(data) => data,
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// A drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub locked: bool,
    /// Stacking position; larger values are drawn on top.
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub group: Option<GroupId>,
    /// Rotation angle in radians (around the frame center).
    #[serde(default)]
    pub rotation: f64,
    /// Set while the element is being drawn.
    #[serde(skip)]
    pub creating: bool,
    /// Marked by the eraser, removed when the gesture ends.
    #[serde(skip)]
    pub erased: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(kind: ElementKind, frame: Frame) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            opacity: 1.0,
            selected: false,
            locked: false,
            order: 0,
            group: None,
            rotation: 0.0,
            creating: false,
            erased: false,
            kind,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Give the element a fresh identity (used when duplicating or pasting).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Normalized bounding rectangle, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        self.frame.rect()
    }

    /// Copy suitable for history and persistence, with transient state cleared.
    pub fn snapshot(&self) -> Element {
        let mut copy = self.clone();
        copy.selected = false;
        copy.creating = false;
        copy.erased = false;
        copy
    }

    /// Same content, ignoring selection and transient flags.
    pub fn same_content(&self, other: &Element) -> bool {
        self.snapshot() == other.snapshot()
    }

    pub fn is_text_capable(&self) -> bool {
        self.element_type().is_text_capable()
    }

    pub fn text_content(&self) -> Option<&str> {
        self.kind.behavior().text()
    }

    /// Replace the element's text and re-run layout. Returns false for
    /// elements without text.
    pub fn set_text_content(&mut self, content: &str, ctx: &HookContext<'_>) -> bool {
        if !self.kind.behavior_mut().set_text(content) {
            return false;
        }
        self.kind
            .behavior_mut()
            .on_update(&mut self.frame, &[Property::Content], ctx);
        true
    }

    /// Whether `point` (world space) is on the element.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = handles::rotate_about(point, self.frame.center(), -self.rotation);
        self.kind.behavior().hit_test(&self.frame, local, tolerance)
    }

    /// Convert a world point into the element's unrotated space.
    pub fn to_local(&self, point: Point) -> Point {
        handles::rotate_about(point, self.frame.center(), -self.rotation)
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.kind.behavior().handles(&self.frame, self.rotation)
    }

    pub fn snap_edges(&self) -> Vec<SnapEdge> {
        self.kind.behavior().snap_edges(&self.frame)
    }

    pub fn create_start(&mut self, point: Point, ctx: &HookContext<'_>) {
        self.kind
            .behavior_mut()
            .on_create_start(&mut self.frame, point, ctx);
    }

    pub fn create_move(&mut self, point: Point, ctx: &HookContext<'_>) {
        self.kind
            .behavior_mut()
            .on_create_move(&mut self.frame, point, ctx);
    }

    pub fn create_end(&mut self, ctx: &HookContext<'_>) {
        self.kind.behavior_mut().on_create_end(&mut self.frame, ctx);
        // freehand pads itself to the grid; arrow frames follow their endpoints
        let own_grid = matches!(
            self.element_type(),
            ElementType::FreehandDraw | ElementType::Arrow
        );
        if ctx.settings.grid_enabled && !own_grid {
            self.frame.expand_to_grid(ctx.settings.grid_size);
        }
        self.creating = false;
    }

    pub fn is_degenerate(&self) -> bool {
        self.kind.behavior().is_degenerate(&self.frame)
    }

    /// Move the element and its internal geometry by `delta`.
    pub fn drag(&mut self, delta: Vec2) {
        self.frame.translate(delta);
        self.kind.behavior_mut().on_drag(delta);
    }

    pub fn resize_start(&mut self, handle: HandleKind) {
        self.kind.behavior_mut().on_resize_start(&self.frame, handle);
    }

    /// Resize towards a local-space point. Call on a copy of the gesture-start state.
    pub fn resize(&mut self, handle: HandleKind, point: Point, ctx: &HookContext<'_>) {
        self.kind
            .behavior_mut()
            .on_resize(&mut self.frame, handle, point, ctx);
    }

    pub fn resize_end(&mut self, ctx: &HookContext<'_>) {
        self.kind.behavior_mut().on_resize_end(&mut self.frame, ctx);
    }

    /// Rotate by `angle` radians about the frame center.
    pub fn rotate_by(&mut self, angle: f64) {
        self.rotation = normalize_angle(self.rotation + angle);
    }

    /// Validate a property update against the element's type.
    pub fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::Opacity, PropertyValue::Number(v)) => (0.0..=1.0).contains(v),
            (Property::Locked, PropertyValue::Bool(_)) => true,
            (Property::Opacity | Property::Locked, _) => false,
            _ => self.kind.behavior().is_value_allowed(property, value),
        }
    }

    /// Apply a property if allowed, re-running layout. Returns whether it was applied.
    pub fn set_property(
        &mut self,
        property: Property,
        value: &PropertyValue,
        ctx: &HookContext<'_>,
    ) -> bool {
        if !self.is_value_allowed(property, value) {
            return false;
        }
        let applied = match (property, value) {
            (Property::Opacity, PropertyValue::Number(v)) => {
                self.opacity = *v;
                true
            }
            (Property::Locked, PropertyValue::Bool(b)) => {
                self.locked = *b;
                true
            }
            _ => self.kind.behavior_mut().apply_property(property, value),
        };
        if applied {
            self.kind
                .behavior_mut()
                .on_update(&mut self.frame, &[property], ctx);
        }
        applied
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Union of the normalized frames of `elements`.
pub fn elements_bounds(elements: &[Element]) -> Option<Frame> {
    elements
        .iter()
        .map(|e| e.frame.normalized())
        .reduce(|a, b| a.union(&b))
}

/// Copies of `elements` moved by `delta`, with fresh element and group ids.
///
/// Arrow bindings between copied elements are redirected to the copies;
/// bindings to anything outside the set are dropped.
pub fn duplicate_elements(elements: &[Element], delta: Vec2) -> Vec<Element> {
    let mut ids = HashMap::new();
    let mut groups = HashMap::new();
    let mut copies: Vec<Element> = elements
        .iter()
        .map(|source| {
            let mut copy = source.snapshot();
            copy.regenerate_id();
            ids.insert(source.id(), copy.id());
            copy.group = source
                .group
                .map(|g| *groups.entry(g).or_insert_with(Uuid::new_v4));
            copy.drag(delta);
            copy
        })
        .collect();

    for copy in &mut copies {
        if let ElementKind::Arrow(arrow) = &mut copy.kind {
            for binding in [&mut arrow.start_binding, &mut arrow.end_binding] {
                *binding = binding.and_then(|b| {
                    ids.get(&b.element).map(|&element| ArrowBinding { element, ..b })
                });
            }
        }
    }
    copies
}
