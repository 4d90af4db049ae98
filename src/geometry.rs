//! Small geometry helpers shared by the catalog and mosaic stages.

use geo::{Coord, Rect};
use rstar::{AABB, RTreeObject};

/// Build a rectangle from edge coordinates.
pub fn rect(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Rect<f64> {
    Rect::new(Coord { x: minx, y: miny }, Coord { x: maxx, y: maxy })
}

/// Combined bounding rectangle of a set of rectangles.
pub fn union_rects(rects: impl IntoIterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    rects.into_iter().reduce(|a, b| {
        Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        )
    })
}

/// R-tree envelope for a rectangle.
pub fn envelope(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}

/// A footprint in an R-tree, associated with an asset by index.
#[derive(Debug, Clone)]
pub(crate) struct FootprintBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl FootprintBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    pub(crate) fn idx(&self) -> usize {
        self.idx
    }
}

impl RTreeObject for FootprintBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(&self.bbox)
    }
}
