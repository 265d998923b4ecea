// Text → glyph placements on a fixed grid.

use cellglyph_core::GlyphPlacement;
use unicode_width::UnicodeWidthChar;

use crate::glyph_cache::AtlasGlyph;

/// Lay `text` out one line per row, clipped to `cols`×`rows`.
///
/// Wide characters take two cells, zero-width characters are drawn in the
/// cell of the character before them, and blanks produce no placement.
/// `lookup` resolves a character to its atlas glyph; `None` skips it.
pub fn place_text<F>(
    text: &str,
    cols: usize,
    rows: usize,
    mut lookup: F,
) -> anyhow::Result<Vec<GlyphPlacement>>
where
    F: FnMut(char) -> anyhow::Result<Option<AtlasGlyph>>,
{
    let mut placements = Vec::new();

    for (row, line) in text.lines().take(rows).enumerate() {
        let mut col = 0;
        let mut previous = None;

        for character in line.chars() {
            // Control characters have no width and no cell.
            let Some(width) = character.width() else {
                continue;
            };

            let cell = if width == 0 {
                match previous {
                    Some(cell) => cell,
                    None => continue,
                }
            } else {
                if col + width > cols {
                    break;
                }
                let cell = col;
                col += width;
                previous = Some(cell);
                cell
            };

            if character.is_whitespace() {
                continue;
            }
            if let Some(glyph) = lookup(character)? {
                placements.push(GlyphPlacement {
                    col: cell,
                    row,
                    region: glyph.region,
                    metrics: glyph.metrics,
                });
            }
        }
    }

    Ok(placements)
}

#[cfg(test)]
mod tests {
    use cellglyph_core::{AtlasRegion, GlyphMetrics};

    use super::*;

    fn glyph(_: char) -> anyhow::Result<Option<AtlasGlyph>> {
        Ok(Some(AtlasGlyph {
            region: AtlasRegion::default(),
            metrics: GlyphMetrics::default(),
        }))
    }

    fn cells(placements: &[GlyphPlacement]) -> Vec<(usize, usize)> {
        placements.iter().map(|p| (p.col, p.row)).collect()
    }

    #[test]
    fn blanks_are_skipped_but_advance() {
        let placements = place_text("a b\n  c", 80, 24, glyph).unwrap();
        assert_eq!(cells(&placements), vec![(0, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn clipped_to_grid() {
        let placements = place_text("abcdef\nx\ny\nz", 4, 2, glyph).unwrap();
        assert_eq!(
            cells(&placements),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (0, 1)]
        );
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let placements = place_text("漢a", 80, 1, glyph).unwrap();
        assert_eq!(cells(&placements), vec![(0, 0), (2, 0)]);

        // No half-visible wide glyph at the right edge.
        let placements = place_text("a漢", 2, 1, glyph).unwrap();
        assert_eq!(cells(&placements), vec![(0, 0)]);
    }

    #[test]
    fn zero_width_joins_previous_cell() {
        let placements = place_text("e\u{301}x", 80, 1, glyph).unwrap();
        assert_eq!(cells(&placements), vec![(0, 0), (0, 0), (1, 0)]);
    }

    #[test]
    fn lookup_misses_are_skipped() {
        let placements = place_text("abc", 80, 1, |c| {
            if c == 'b' {
                Ok(None)
            } else {
                glyph(c)
            }
        })
        .unwrap();
        assert_eq!(cells(&placements), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn lookup_errors_propagate() {
        let result = place_text("abc", 80, 1, |_| anyhow::bail!("atlas full"));
        assert!(result.is_err());
    }
}
