//! TranspositionCodec: multi-directional columnar rearrangement.
//!
//! A message of `n` symbols is written row-major into a grid of width `w`
//! and `ceil(n / w)` rows. The last row is virtually padded with
//! `(w - n mod w) mod w` pad cells that every traversal skips, so no pad
//! symbol is ever emitted: the ciphertext has exactly `n` symbols and the pad
//! count is recovered from its length.
//!
//! Each direction of the key turns the current sequence into a new one by
//! reading the grid in that order. The next direction re-grids the result
//! at the same width. Decoding applies the inverse permutations in reverse.
//!
//! The column traversals (`TB`, `BT`) visit the columns in the key's column
//! order; with a shuffled order `TB` is the classic keyed columnar
//! transposition. Row traversals do not depend on the column order.

use crate::error::{MlccError, Result};
use crate::key::{Direction, TranspositionKey};

/// Geometry of one grid: `rows x width` cells, of which the first `len`
/// (row-major) hold symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Grid {
    len: usize,
    width: usize,
    rows: usize,
}

impl Grid {
    /// # Errors
    /// Returns [`MlccError::InvalidGridDimensions`] if `width` is zero.
    pub(crate) fn new(len: usize, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(MlccError::InvalidGridDimensions { width, len });
        }
        Ok(Grid {
            len,
            width,
            rows: len.div_ceil(width),
        })
    }

    /// Number of virtual pad cells in the last row.
    pub(crate) fn pad_count(&self) -> usize {
        self.rows * self.width - self.len
    }

    fn cell(&self, row: usize, col: usize) -> Option<usize> {
        let index = row * self.width + col;
        (index < self.len).then_some(index)
    }

    /// Row-major indices of the occupied cells, in the order `direction`
    /// reads them. `columns` is the visiting order of the column traversals.
    pub(crate) fn reading_order(&self, direction: Direction, columns: &[usize]) -> Vec<usize> {
        let (rows, width) = (self.rows, self.width);
        let cells: Box<dyn Iterator<Item = (usize, usize)> + '_> = match direction {
            Direction::LeftRight => {
                Box::new((0..rows).flat_map(move |r| (0..width).map(move |c| (r, c))))
            }
            Direction::RightLeft => {
                Box::new((0..rows).flat_map(move |r| (0..width).rev().map(move |c| (r, c))))
            }
            Direction::TopBottom => {
                Box::new(columns.iter().flat_map(move |&c| (0..rows).map(move |r| (r, c))))
            }
            Direction::BottomTop => {
                Box::new(columns.iter().flat_map(move |&c| (0..rows).rev().map(move |r| (r, c))))
            }
            Direction::ZigZag => Box::new((0..rows).flat_map(move |r| {
                let forward = r % 2 == 0;
                (0..width).map(move |i| (r, if forward { i } else { width - 1 - i }))
            })),
        };
        cells.filter_map(|(r, c)| self.cell(r, c)).collect()
    }
}

/// Encodes `message` with the key's width, column order and direction
/// chain.
///
/// # Errors
/// Returns [`MlccError::InvalidGridDimensions`] if the key width is zero.
///
/// # Examples
///
/// ```
/// use mlcc::{transposition_codec, Direction, TranspositionKey};
///
/// let key = TranspositionKey::new(3, vec![Direction::TopBottom]).unwrap();
/// assert_eq!(transposition_codec::encode("abcdefg", &key).unwrap(), "adgbecf");
/// ```
pub fn encode(message: &str, key: &TranspositionKey) -> Result<String> {
    let symbols: Vec<char> = message.chars().collect();
    let encoded = encode_symbols(&symbols, key.width(), key.column_order(), key.directions())?;
    Ok(encoded.into_iter().collect())
}

/// Decodes `ciphertext`, stripping exactly the virtual padding added by
/// [`encode`].
///
/// # Errors
/// Returns [`MlccError::InvalidGridDimensions`] if the key width is zero.
pub fn decode(ciphertext: &str, key: &TranspositionKey) -> Result<String> {
    let symbols: Vec<char> = ciphertext.chars().collect();
    let decoded = decode_symbols(&symbols, key.width(), key.column_order(), key.directions())?;
    Ok(decoded.into_iter().collect())
}

/// Applies the direction chain to a symbol sequence. `columns` must be a
/// permutation of `0..width`.
pub(crate) fn encode_symbols<T: Copy>(
    symbols: &[T],
    width: usize,
    columns: &[usize],
    directions: &[Direction],
) -> Result<Vec<T>> {
    let grid = Grid::new(symbols.len(), width)?;
    let mut current = symbols.to_vec();
    for &direction in directions {
        current = grid
            .reading_order(direction, columns)
            .into_iter()
            .map(|index| current[index])
            .collect();
    }
    Ok(current)
}

/// Undoes [`encode_symbols`] for the same width, column order and chain.
pub(crate) fn decode_symbols<T: Copy>(
    symbols: &[T],
    width: usize,
    columns: &[usize],
    directions: &[Direction],
) -> Result<Vec<T>> {
    let grid = Grid::new(symbols.len(), width)?;
    let mut current = symbols.to_vec();
    for &direction in directions.iter().rev() {
        let mut previous = current.clone();
        for (position, index) in grid.reading_order(direction, columns).into_iter().enumerate() {
            previous[index] = current[position];
        }
        current = previous;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(width: usize, directions: &[Direction]) -> TranspositionKey {
        TranspositionKey::new(width, directions.to_vec()).unwrap()
    }

    #[test]
    fn test_reading_orders_on_partial_grid() {
        // 7 symbols, width 3: rows [0 1 2] [3 4 5] [6 _ _]
        let grid = Grid::new(7, 3).unwrap();
        let columns = [0, 1, 2];
        assert_eq!(grid.pad_count(), 2);
        assert_eq!(grid.reading_order(Direction::LeftRight, &columns), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(grid.reading_order(Direction::RightLeft, &columns), vec![2, 1, 0, 5, 4, 3, 6]);
        assert_eq!(grid.reading_order(Direction::TopBottom, &columns), vec![0, 3, 6, 1, 4, 2, 5]);
        assert_eq!(grid.reading_order(Direction::BottomTop, &columns), vec![6, 3, 0, 4, 1, 5, 2]);
        assert_eq!(grid.reading_order(Direction::ZigZag, &columns), vec![0, 1, 2, 5, 4, 3, 6]);
    }

    #[test]
    fn test_column_order_applies_to_column_traversals_only() {
        // rows [0 1 2] [3 4 5] [6 _ _], columns read as 2, 0, 1
        let grid = Grid::new(7, 3).unwrap();
        let columns = [2, 0, 1];
        assert_eq!(grid.reading_order(Direction::TopBottom, &columns), vec![2, 5, 0, 3, 6, 1, 4]);
        assert_eq!(grid.reading_order(Direction::BottomTop, &columns), vec![5, 2, 6, 3, 0, 4, 1]);
        assert_eq!(grid.reading_order(Direction::LeftRight, &columns), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(grid.reading_order(Direction::ZigZag, &columns), vec![0, 1, 2, 5, 4, 3, 6]);
    }

    #[test]
    fn test_keyed_columnar_vector() {
        let key = key(4, &[Direction::TopBottom])
            .with_column_order(vec![2, 0, 3, 1])
            .unwrap();
        assert_eq!(encode("nbuojmnbeodp", &key).unwrap(), "undnjeobpbmo");
        assert_eq!(decode("undnjeobpbmo", &key).unwrap(), "nbuojmnbeodp");
    }

    #[test]
    fn test_zero_width_fails() {
        assert!(matches!(
            Grid::new(5, 0),
            Err(MlccError::InvalidGridDimensions { width: 0, len: 5 })
        ));
        assert!(encode_symbols(&['a'], 0, &[], &[Direction::TopBottom]).is_err());
        assert!(decode_symbols(&['a'], 0, &[], &[Direction::TopBottom]).is_err());
    }

    #[test]
    fn test_left_right_is_identity() {
        let key = key(4, &[Direction::LeftRight]);
        assert_eq!(encode("nbuojmnbeodp", &key).unwrap(), "nbuojmnbeodp");
    }

    #[test]
    fn test_columnar_vector() {
        let key = key(4, &[Direction::TopBottom]);
        assert_eq!(encode("nbuojmnbeodp", &key).unwrap(), "njebmoundobp");
        assert_eq!(decode("njebmoundobp", &key).unwrap(), "nbuojmnbeodp");
    }

    #[test]
    fn test_chained_vector() {
        let key = key(5, &[Direction::ZigZag, Direction::BottomTop]);
        assert_eq!(encode("nbuojmnbeodp", &key).unwrap(), "donpebbunomj");
        assert_eq!(decode("donpebbunomj", &key).unwrap(), "nbuojmnbeodp");
    }

    #[test]
    fn test_foreign_symbols_are_permuted_too() {
        let key = key(4, &[Direction::TopBottom, Direction::RightLeft]);
        let message = "zmfh tg nb uvl qyl cfpftm, 9qa!";
        let encoded = encode(message, &key).unwrap();
        assert_eq!(encoded, "vn zqmfylbtma,pl  gf! f qu h9tc");
        assert_eq!(decode(&encoded, &key).unwrap(), message);
    }

    #[test]
    fn test_reversible_for_every_length_and_chain() {
        let chains: Vec<Vec<Direction>> = Direction::ALL
            .iter()
            .flat_map(|&a| Direction::ALL.iter().map(move |&b| vec![a, b]))
            .collect();
        for width in 1..=6 {
            let reversed: Vec<usize> = (0..width).rev().collect();
            for len in 0..=(5 * width + 1) {
                let symbols: Vec<usize> = (0..len).collect();
                for chain in &chains {
                    let encoded = encode_symbols(&symbols, width, &reversed, chain).unwrap();
                    assert_eq!(encoded.len(), len);
                    let decoded = decode_symbols(&encoded, width, &reversed, chain).unwrap();
                    assert_eq!(decoded, symbols, "width {} len {} chain {:?}", width, len, chain);
                }
            }
        }
    }

    #[test]
    fn test_empty_message() {
        let key = key(3, &[Direction::ZigZag, Direction::TopBottom]);
        assert_eq!(encode("", &key).unwrap(), "");
        assert_eq!(decode("", &key).unwrap(), "");
    }
}
