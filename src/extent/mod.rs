//! Collar handling: derive the true map extent of a scanned sheet from its
//! georeferenced bounds and the grid conventions of its map series.

mod ident;
mod offsets;
mod resolve;

pub use ident::{MapIdent, parse_ident};
pub use offsets::{GridOffset, grid_offset};
pub use resolve::{ExtentError, extent_from_url, resolve_extent};
