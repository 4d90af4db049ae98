use geo::Rect;

use super::ident::MapIdent;
use super::resolve::ExtentError;

/// Collar grid spacing in degrees, per axis. The printed map area of a sheet
/// starts and ends on multiples of these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOffset {
    pub x: f64,
    pub y: f64,
}

impl GridOffset {
    const fn square(v: f64) -> Self {
        Self { x: v, y: v }
    }

    const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the grid spacing is determined for one scale.
///
/// Most series have a single spacing; two historical scales need extra
/// context (sheet latitude, or the individual quadrangle) to disambiguate.
enum OffsetRule {
    /// One spacing for both axes, everywhere.
    Uniform(f64),
    /// Spacing chosen by the sheet's northern latitude (1:63,360).
    LatitudeBanded,
    /// Latitude-banded base with per-quadrangle overrides (1:250,000).
    NamedException,
}

/// Smallest grid spacing observed for each uniform map series, from the
/// cross tabulation of grid size by scale in the HTMC catalog.
const UNIFORM_OFFSETS: &[(u32, f64)] = &[
    (10000, 0.0625),
    (12000, 0.0625),
    (20000, 0.125),
    (21120, 0.125),
    (24000, 0.125),
    (25000, 0.125),
    (30000, 0.125),
    (31680, 0.125),
    (48000, 0.125),
    (50000, 0.25),
    (62500, 0.125),
    (96000, 0.25),
    (100000, 0.5),
    (125000, 0.5),
    (192000, 0.5),
];

fn rule_for_scale(scale: u32) -> Option<OffsetRule> {
    if let Some(&(_, v)) = UNIFORM_OFFSETS.iter().find(|(s, _)| *s == scale) {
        return Some(OffsetRule::Uniform(v));
    }
    match scale {
        63360 => Some(OffsetRule::LatitudeBanded),
        250000 => Some(OffsetRule::NamedException),
        _ => None,
    }
}

/// Resolve the collar grid spacing for a sheet.
///
/// `ident` is only consulted for the 1:250,000 named-quadrangle exceptions;
/// passing `None` falls back to the latitude-banded base rule.
pub fn grid_offset(
    scale: u32,
    bounds: &Rect<f64>,
    ident: Option<&MapIdent>,
) -> Result<GridOffset, ExtentError> {
    match rule_for_scale(scale).ok_or(ExtentError::UnresolvableScale(scale))? {
        OffsetRule::Uniform(v) => Ok(GridOffset::square(v)),
        OffsetRule::LatitudeBanded => Ok(offset_63360(bounds)),
        OffsetRule::NamedException => Ok(offset_250000(bounds, ident)),
    }
}

/// 1:63,360 sheets narrow with latitude: the lower 48 use 15-minute
/// quadrangles, Alaska a ladder of wider longitude bands.
fn offset_63360(bounds: &Rect<f64>) -> GridOffset {
    let maxy = bounds.max().y;
    if maxy < 49.25 {
        GridOffset::square(0.25)
    } else if maxy < 59.25 {
        GridOffset::new(1.0 / 3.0, 0.25)
    } else if maxy < 62.25 {
        GridOffset::new(0.375, 0.25)
    } else if maxy < 68.25 {
        GridOffset::new(0.5, 0.25)
    } else {
        // Far-north sheets are 0.6 degrees wide.
        GridOffset::new(0.2, 0.25)
    }
}

/// Longitude overrides for 1:250,000 coastal quadrangles whose west or east
/// edge is not on the half-degree grid: (state, map name, x offset).
const QUAD_250000_EXCEPTIONS: &[(&str, &str, f64)] = &[
    ("ca", "santacruz", 0.2),
    ("wa", "vancouver", 0.1),    // west long is -124.0833
    ("or", "salem", 0.18),       // west long is -124.1833
    ("sc", "georgetown", 0.12),  // east long is -77.8833333
    ("ri", "providence", 0.12),  // east long is -69.8833333
];

fn offset_250000(bounds: &Rect<f64>, ident: Option<&MapIdent>) -> GridOffset {
    let mut offset = GridOffset::square(0.5);

    // Alaska
    if bounds.min().y > 49.0 {
        offset = if bounds.max().y < 59.5 {
            GridOffset::new(0.5, 0.25)
        } else {
            GridOffset::square(1.0)
        };
    }

    if let Some(ident) = ident {
        for &(state, name, x) in QUAD_250000_EXCEPTIONS {
            if ident.state == state && ident.map_name == name {
                offset.x = x;
                break;
            }
        }
    }

    offset
}
