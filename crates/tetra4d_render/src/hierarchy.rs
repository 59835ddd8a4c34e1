//! Hierarchical screen-tile buffer layout
//!
//! Addressing scheme for the mip-style tile hierarchy used by the shadow
//! hypervolume computer, as in "An Efficient Alias-free Shadow Algorithm for
//! Opaque and Transparent Objects using per-triangle Shadow Volumes"
//! (Sintorn, Olsson & Assarsson 2011). Hard-coded for 5 levels of 32-cell
//! tiles, alternating between 8x4 and 4x8 subdivision so tiles stay close to
//! the screen aspect ratio at every refinement step.
//!
//! All five levels live concatenated in a single linear GPU buffer; these
//! constants are mirrored in `shaders/reduction.wgsl`,
//! `shaders/shadow_test.wgsl` and `shaders/shading.wgsl` and must not change
//! independently of them.

/// Number of hierarchy levels, level 0 being the coarsest (8x4 over the screen).
pub const LEVELS: usize = 5;

/// First element of each level within the concatenated buffer.
pub const OFFSETS: [usize; LEVELS] = [0, 32, 1056, 33824, 1082400];

/// 2D extent of each level, in cells.
pub const WIDTHS: [usize; LEVELS] = [8, 32, 256, 1024, 8192];
pub const HEIGHTS: [usize; LEVELS] = [4, 32, 128, 1024, 4096];

/// Tile shape at each level: a level-`L` tile is `TILE_WIDTHS[L]` x
/// `TILE_HEIGHTS[L]` cells covering one cell of level `L - 1` (level 0 is a
/// single 8x4 tile covering the whole screen).
pub const TILE_WIDTHS: [usize; LEVELS] = [8, 4, 8, 4, 8];
pub const TILE_HEIGHTS: [usize; LEVELS] = [4, 8, 4, 8, 4];

/// Cells in the AABB hierarchy: levels 0 through 3. The last level is
/// per-pixel and only exists in the shadow-bit buffer.
pub const HIERARCHY_CELLS: usize = OFFSETS[4];

/// Flat index of cell `(x, y)` at `level`.
#[inline]
pub fn cell_index(level: usize, x: usize, y: usize) -> usize {
    debug_assert!(x < WIDTHS[level] && y < HEIGHTS[level]);
    OFFSETS[level] + y * WIDTHS[level] + x
}

/// Flat index of the `(dx, dy)` sub-cell, one level down from cell `(x, y)`
/// at `level`. The walk starts from the pixel's containing cell at level 0
/// and descends one level at a time.
#[inline]
pub fn child_index(level: usize, x: usize, y: usize, dx: usize, dy: usize) -> usize {
    debug_assert!(dx < TILE_WIDTHS[level + 1] && dy < TILE_HEIGHTS[level + 1]);
    cell_index(
        level + 1,
        x * TILE_WIDTHS[level + 1] + dx,
        y * TILE_HEIGHTS[level + 1] + dy,
    )
}

/// Size of the shadow-bit buffer in 32-bit words for a `w` x `h` screen:
/// one bit per hierarchy cell plus one bit per pixel.
#[inline]
pub fn shadow_word_count(w: u32, h: u32) -> u64 {
    (HIERARCHY_CELLS as u64 + w as u64 * h as u64).div_ceil(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_prefix_sums_of_level_areas() {
        for level in 0..LEVELS - 1 {
            assert_eq!(
                OFFSETS[level + 1] - OFFSETS[level],
                WIDTHS[level] * HEIGHTS[level],
                "level {} area mismatch",
                level
            );
        }
    }

    #[test]
    fn test_dimensions_grow_by_tile_factors() {
        for level in 0..LEVELS - 1 {
            assert_eq!(WIDTHS[level + 1], WIDTHS[level] * TILE_WIDTHS[level + 1]);
            assert_eq!(HEIGHTS[level + 1], HEIGHTS[level] * TILE_HEIGHTS[level + 1]);
        }
    }

    #[test]
    fn test_every_tile_holds_32_cells() {
        for level in 0..LEVELS {
            assert_eq!(TILE_WIDTHS[level] * TILE_HEIGHTS[level], 32);
        }
    }

    #[test]
    fn test_cell_index_ranges() {
        assert_eq!(cell_index(0, 0, 0), 0);
        assert_eq!(cell_index(1, 0, 0), OFFSETS[1]);
        assert_eq!(
            cell_index(3, WIDTHS[3] - 1, HEIGHTS[3] - 1),
            OFFSETS[4] - 1
        );
    }

    #[test]
    fn test_child_index_walk() {
        // children of a cell tile the corresponding region of the next level
        let (x, y) = (3, 2);
        let first = child_index(0, x, y, 0, 0);
        assert_eq!(first, cell_index(1, x * 4, y * 8));
        let last = child_index(0, x, y, 3, 7);
        assert_eq!(last, cell_index(1, x * 4 + 3, y * 8 + 7));

        // two distinct parents never share a child
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for x in 0..2 {
            for dy in 0..TILE_HEIGHTS[3] {
                for dx in 0..TILE_WIDTHS[3] {
                    assert!(seen.insert(child_index(2, x, 0, dx, dy)));
                }
            }
        }
    }

    #[test]
    fn test_shadow_word_count() {
        // 1 bit per hierarchy cell and per pixel, packed into u32 words
        assert_eq!(
            shadow_word_count(1280, 720),
            ((HIERARCHY_CELLS + 1280 * 720) as u64).div_ceil(32)
        );
    }
}
