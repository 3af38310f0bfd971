//! Quadkey encoding.
//!
//! Each zoom level contributes one base-4 digit, most significant level
//! first. The digit packs the tile index bits of that level as
//! `bit_x + 2 * bit_y`. Zoom 0 is the empty string.

use super::{TileCoord, TileMathError, MAX_ZOOM};

/// Converts a tile into its quadkey.
///
/// Levels beyond the 32 bits of a tile index contribute `0` digits.
pub fn tile_to_quadkey(tile: &TileCoord) -> String {
    (1..=tile.zoom)
        .rev()
        .map(|level| {
            let mask = 1u32.checked_shl(u32::from(level - 1)).unwrap_or(0);
            let mut digit = b'0';
            if tile.x & mask != 0 {
                digit += 1;
            }
            if tile.y & mask != 0 {
                digit += 2;
            }
            char::from(digit)
        })
        .collect()
}

/// Converts a quadkey back into a tile; the zoom is the quadkey length.
///
/// # Errors
///
/// - `InvalidZoom` if the quadkey is longer than the maximum zoom
/// - `InvalidQuadkey` if it contains anything other than `0`-`3`
pub fn quadkey_to_tile(quadkey: &str) -> Result<TileCoord, TileMathError> {
    let zoom = match u8::try_from(quadkey.len()) {
        Ok(zoom) if zoom <= MAX_ZOOM => zoom,
        _ => {
            let saturated = quadkey.len().min(usize::from(u8::MAX)) as u8;
            return Err(TileMathError::InvalidZoom(saturated));
        }
    };

    let mut x = 0u32;
    let mut y = 0u32;
    for (i, digit) in quadkey.bytes().enumerate() {
        let mask = 1u32 << (usize::from(zoom) - i - 1);
        match digit {
            b'0' => {}
            b'1' => x |= mask,
            b'2' => y |= mask,
            b'3' => {
                x |= mask;
                y |= mask;
            }
            _ => return Err(TileMathError::InvalidQuadkey(quadkey.to_string())),
        }
    }

    Ok(TileCoord { x, y, zoom })
}
