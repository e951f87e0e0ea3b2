/// Single coordinate axis used for board dimensions and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board coordinates `(x, y)`.
///
/// Convention used everywhere in this workspace: `x` is the row index and is
/// bounded by the board height, `y` is the column index and is bounded by the
/// width. A board size is therefore `(height, width)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn apply_delta((x, y): Coord2, (dx, dy): (i8, i8), (max_x, max_y): Coord2) -> Option<Coord2> {
    let next_x = x.checked_add_signed(dx)?;
    let next_y = y.checked_add_signed(dy)?;
    (next_x < max_x && next_y < max_y).then_some((next_x, next_y))
}

/// Iterates the in-bounds neighbors of `center`, up to 8 cells at Chebyshev
/// distance 1.
pub fn neighbors(center: Coord2, bounds: Coord2) -> impl Iterator<Item = Coord2> {
    DISPLACEMENTS
        .iter()
        .filter_map(move |&delta| apply_delta(center, delta, bounds))
}

/// The clipped 3x3 neighborhood around `center`, center included. This is the
/// zone the generator keeps mine-free around the first revealed cell.
pub fn safe_zone(center: Coord2, bounds: Coord2) -> impl Iterator<Item = Coord2> {
    core::iter::once(center).chain(neighbors(center, bounds))
}
