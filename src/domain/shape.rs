/// Shape catalog: the seven piece kinds, their colors and rotation tables.
///
/// Every rotation state is a square matrix (2x2, 3x3 or 4x4) of occupied
/// sub-cells. Tables are static and never mutated.

/// Piece kinds, in catalog order. The color palette is index-aligned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

/// Fixed seven-color palette, one color per kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

impl Color {
    pub const PALETTE: [Color; 7] = [
        Color::Cyan,
        Color::Blue,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Purple,
        Color::Red,
    ];
}

/// One rotation state. Rows are listed top to bottom.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: &'static [&'static [u8]],
}

impl Shape {
    const fn new(rows: &'static [&'static [u8]]) -> Self {
        Shape { rows }
    }

    /// Side length N of the NxN matrix.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Offsets `(dx, dy)` of every occupied sub-cell relative to the origin.
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, _)| (c as i32, r as i32))
        })
    }

    /// Index of the lowest occupied row + 1.
    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|&v| v != 0))
            .map_or(0, |r| r + 1)
    }
}

// ── Rotation tables ──

static I_STATES: [Shape; 2] = [
    Shape::new(&[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]]),
    Shape::new(&[&[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0]]),
];

static J_STATES: [Shape; 4] = [
    Shape::new(&[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]]),
    Shape::new(&[&[0, 1, 1], &[0, 1, 0], &[0, 1, 0]]),
    Shape::new(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 1]]),
    Shape::new(&[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]]),
];

static L_STATES: [Shape; 4] = [
    Shape::new(&[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]]),
    Shape::new(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]]),
    Shape::new(&[&[0, 0, 0], &[1, 1, 1], &[1, 0, 0]]),
    Shape::new(&[&[1, 1, 0], &[0, 1, 0], &[0, 1, 0]]),
];

static O_STATES: [Shape; 1] = [Shape::new(&[&[1, 1], &[1, 1]])];

static S_STATES: [Shape; 2] = [
    Shape::new(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
    Shape::new(&[&[0, 1, 0], &[0, 1, 1], &[0, 0, 1]]),
];

static T_STATES: [Shape; 4] = [
    Shape::new(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
    Shape::new(&[&[0, 1, 0], &[0, 1, 1], &[0, 1, 0]]),
    Shape::new(&[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]]),
    Shape::new(&[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0]]),
];

static Z_STATES: [Shape; 2] = [
    Shape::new(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
    Shape::new(&[&[0, 0, 1], &[0, 1, 1], &[0, 1, 0]]),
];

impl Kind {
    pub const ALL: [Kind; 7] = [Kind::I, Kind::J, Kind::L, Kind::O, Kind::S, Kind::T, Kind::Z];

    /// Ordered rotation states; index wraps modulo the slice length.
    pub fn rotation_states(self) -> &'static [Shape] {
        match self {
            Kind::I => &I_STATES,
            Kind::J => &J_STATES,
            Kind::L => &L_STATES,
            Kind::O => &O_STATES,
            Kind::S => &S_STATES,
            Kind::T => &T_STATES,
            Kind::Z => &Z_STATES,
        }
    }

    pub fn color(self) -> Color {
        Color::PALETTE[self as usize]
    }
}
