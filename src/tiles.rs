//! AV1 tile layout planning
//!
//! Picks the smallest tile grid that keeps every tile within the AV1 level
//! limits on tile width and tile area, splitting along the longer side first.

/// Largest tile width in luma samples
pub const MAX_TILE_WIDTH: u32 = 4096;
/// Largest tile area in luma samples
pub const MAX_TILE_AREA: u32 = 4096 * 2304;
/// Largest number of tile columns
pub const MAX_TILE_COLS: u32 = 64;
/// Largest number of tile rows
pub const MAX_TILE_ROWS: u32 = 64;

/// Superblocks are 128x128 (mode-info units of 4 samples, 32 per superblock)
const SB_SHIFT: u32 = 5;
const SB_SIZE_LOG2: u32 = SB_SHIFT + 2;

/// Tile counts as log2 values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileGeometry {
    pub tile_cols_log2: u32,
    pub tile_rows_log2: u32,
}

impl TileGeometry {
    pub fn tile_cols(&self) -> u32 {
        1 << self.tile_cols_log2
    }

    pub fn tile_rows(&self) -> u32 {
        1 << self.tile_rows_log2
    }
}

/// Bounds derived from the frame size, before any splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLimits {
    pub sb_cols: u32,
    pub sb_rows: u32,
    pub min_log2_tile_cols: u32,
    pub max_log2_tile_cols: u32,
    pub max_log2_tile_rows: u32,
    pub min_log2_tiles: u32,
}

impl TileLimits {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        let mi_cols = 2 * ((frame_width + 7) >> 3);
        let mi_rows = 2 * ((frame_height + 7) >> 3);
        let sb_cols = (mi_cols + 31) >> SB_SHIFT;
        let sb_rows = (mi_rows + 31) >> SB_SHIFT;

        let max_tile_width_sb = MAX_TILE_WIDTH >> SB_SIZE_LOG2;
        let max_tile_area_sb = MAX_TILE_AREA >> (2 * SB_SIZE_LOG2);

        let min_log2_tile_cols = tile_log2(max_tile_width_sb, sb_cols);
        let max_log2_tile_cols = tile_log2(1, sb_cols.min(MAX_TILE_COLS));
        let max_log2_tile_rows = tile_log2(1, sb_rows.min(MAX_TILE_ROWS));
        let min_log2_tiles =
            min_log2_tile_cols.max(tile_log2(max_tile_area_sb, sb_rows * sb_cols));

        Self {
            sb_cols,
            sb_rows,
            min_log2_tile_cols,
            max_log2_tile_cols,
            max_log2_tile_rows,
            min_log2_tiles,
        }
    }
}

/// Smallest `k` such that `blk_size << k >= target`
pub fn tile_log2(blk_size: u32, target: u32) -> u32 {
    let mut k = 0;
    while (u64::from(blk_size) << k) < u64::from(target) {
        k += 1;
    }
    k
}

/// Plan the tile grid for a frame.
///
/// Starts from the minimum column count required by the tile width limit,
/// then adds splits until the area limit is met, always halving the
/// currently longer side unless it is already at its maximum. When both
/// sides are at their maximum the search stops short.
pub fn plan(frame_width: u32, frame_height: u32) -> TileGeometry {
    let limits = TileLimits::new(frame_width, frame_height);
    let mut geometry = TileGeometry {
        tile_cols_log2: limits.min_log2_tile_cols,
        tile_rows_log2: 0,
    };

    let mut needed = limits.min_log2_tiles.saturating_sub(limits.min_log2_tile_cols);
    let mut width = frame_width >> limits.min_log2_tile_cols;
    let mut height = frame_height;

    while needed > 0 {
        let cols_open = geometry.tile_cols_log2 < limits.max_log2_tile_cols;
        let rows_open = geometry.tile_rows_log2 < limits.max_log2_tile_rows;
        let split_cols = if width > height {
            cols_open
        } else {
            cols_open && !rows_open
        };

        if split_cols {
            geometry.tile_cols_log2 += 1;
            width >>= 1;
        } else if rows_open {
            geometry.tile_rows_log2 += 1;
            height >>= 1;
        } else {
            break;
        }
        needed -= 1;
    }

    log::trace!(
        "tiles for {frame_width}x{frame_height}: cols_log2={} rows_log2={}",
        geometry.tile_cols_log2,
        geometry.tile_rows_log2
    );
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_tile_area(w: u32, h: u32, g: TileGeometry) -> u32 {
        w.div_ceil(g.tile_cols()) * h.div_ceil(g.tile_rows())
    }

    #[test]
    fn small_frames_use_one_tile() {
        for (w, h) in [(1, 1), (2, 2), (640, 480), (4096, 2304)] {
            assert_eq!(plan(w, h), TileGeometry::default(), "{w}x{h}");
        }
    }

    #[test]
    fn tile_log2_matches_definition() {
        assert_eq!(tile_log2(1, 1), 0);
        assert_eq!(tile_log2(1, 2), 1);
        assert_eq!(tile_log2(1, 3), 2);
        assert_eq!(tile_log2(32, 32), 0);
        assert_eq!(tile_log2(32, 33), 1);
        assert_eq!(tile_log2(4, 0), 0);
    }

    #[test]
    fn square_4096_splits_rows_once() {
        let g = plan(4096, 4096);
        assert_eq!(g, TileGeometry { tile_cols_log2: 0, tile_rows_log2: 1 });
        assert!(max_tile_area(4096, 4096, g) <= MAX_TILE_AREA);
    }

    #[test]
    fn wide_frames_split_columns_first() {
        let g = plan(8192, 2048);
        assert_eq!(g.tile_cols_log2, 1);
        assert_eq!(g.tile_rows_log2, 0);
        assert!(max_tile_area(8192, 2048, g) <= MAX_TILE_AREA);
    }

    #[test]
    fn wide_frames_past_max_width_need_extra_columns() {
        // 16384 wide needs 4 columns by width alone
        let limits = TileLimits::new(16384, 256);
        assert_eq!(limits.min_log2_tile_cols, 2);
        let g = plan(16384, 256);
        assert_eq!(g.tile_cols_log2, 2);
    }

    #[test]
    fn never_exceeds_computed_maxima() {
        for (w, h) in [
            (1, 65536),
            (65536, 1),
            (16384, 16384),
            (8193, 4097),
            (300, 20000),
            (128, 128),
        ] {
            let limits = TileLimits::new(w, h);
            let g = plan(w, h);
            assert!(g.tile_cols_log2 <= limits.max_log2_tile_cols.max(limits.min_log2_tile_cols));
            assert!(g.tile_rows_log2 <= limits.max_log2_tile_rows);
            assert!(g.tile_cols_log2 + g.tile_rows_log2 <= limits.min_log2_tiles.max(limits.min_log2_tile_cols));
        }
    }

    #[test]
    fn tall_narrow_frame_stops_when_rows_saturate() {
        // One superblock wide: columns cannot split, rows cap at 64
        let limits = TileLimits::new(128, 1 << 20);
        let g = plan(128, 1 << 20);
        assert_eq!(g.tile_cols_log2, 0);
        assert_eq!(g.tile_rows_log2, limits.max_log2_tile_rows.min(limits.min_log2_tiles));
    }
}
