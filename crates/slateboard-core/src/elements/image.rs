//! Raster images backed by the document's asset table.

use super::{AssetId, ElementBehavior, Frame};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Longest side given to a pasted image.
pub const MAX_IMAGE_SIZE: f64 = 800.0;

/// An image element.
///
/// `asset_id` is `None` when the referenced asset could not be resolved on
/// import; the element keeps its place and renders as a placeholder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    #[serde(default)]
    pub asset_id: Option<AssetId>,
}

impl ImageData {
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id: Some(asset_id),
        }
    }

    /// Frame for an image of natural size `width` x `height` centered on
    /// `center`, scaled down to fit [`MAX_IMAGE_SIZE`].
    pub fn frame_for(center: Point, width: f64, height: f64) -> Frame {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let scale = (MAX_IMAGE_SIZE / width.max(height)).min(1.0);
        Frame::centered(center, width * scale, height * scale)
    }
}

impl ElementBehavior for ImageData {}
