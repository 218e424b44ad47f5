//! Venue-map geometry: default grid placement and clamping.
//!
//! All coordinates are percentages of the map extent. Positions are kept a
//! little inside the edges so markers never render half off-map.

use carnival_types::{BlockSize, Event, MapPosition};

/// Smallest x or y a marker or block may be placed at.
pub const POSITION_MIN: f64 = 5.0;
/// Largest x or y a marker or block may be placed at.
pub const POSITION_MAX: f64 = 95.0;
/// Narrowest allowed block.
pub const WIDTH_MIN: f64 = 5.0;
/// Widest allowed block.
pub const WIDTH_MAX: f64 = 90.0;
/// Shortest allowed block.
pub const HEIGHT_MIN: f64 = 3.0;
/// Tallest allowed block.
pub const HEIGHT_MAX: f64 = 50.0;

/// Markers per grid row.
const GRID_COLUMNS: usize = 3;
/// Offset of the first grid cell from the top-left corner.
const GRID_ORIGIN: f64 = 20.0;
/// Distance between neighbouring grid cells.
const GRID_SPACING: f64 = 30.0;

/// Default placement for the event at `index` in store order.
///
/// Events fill a three-column grid starting at (20, 20) with 30% spacing.
/// Rows past the bottom of the map are not wrapped.
pub fn grid_position(index: usize) -> MapPosition {
    let row = index.checked_div(GRID_COLUMNS).unwrap_or(0);
    let col = index.checked_rem(GRID_COLUMNS).unwrap_or(0);
    MapPosition {
        x: GRID_SPACING.mul_add(to_f64(col), GRID_ORIGIN),
        y: GRID_SPACING.mul_add(to_f64(row), GRID_ORIGIN),
    }
}

/// The position an event is drawn at: its explicit placement, or the grid
/// slot for its index.
pub fn effective_position(event: &Event, index: usize) -> MapPosition {
    event.map_position.unwrap_or_else(|| grid_position(index))
}

/// Clamp a position into `[POSITION_MIN, POSITION_MAX]` on both axes.
pub fn clamp_position(position: MapPosition) -> MapPosition {
    MapPosition {
        x: clamp(position.x, POSITION_MIN, POSITION_MAX),
        y: clamp(position.y, POSITION_MIN, POSITION_MAX),
    }
}

/// Clamp a block size into the allowed width and height ranges.
pub fn clamp_size(size: BlockSize) -> BlockSize {
    BlockSize {
        width: clamp(size.width, WIDTH_MIN, WIDTH_MAX),
        height: clamp(size.height, HEIGHT_MIN, HEIGHT_MAX),
    }
}

/// `f64::clamp` that maps non-finite input to the lower bound.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

fn to_f64(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}
