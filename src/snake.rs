use serde::{Deserialize, Serialize};
use Direction::*;

/// A tile position. Signed so a head stepping off the board is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn moved(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }

    pub fn in_grid(self, size: u16) -> bool {
        let n = i32::from(size);
        (0..n).contains(&self.x) && (0..n).contains(&self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    /// Unit step in screen coordinates (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Ordered body, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Cell>,
}

impl Snake {
    /// Lays out `length` cells starting at `head` and trailing away from `facing`.
    pub fn new(head: Cell, length: usize, facing: Direction) -> Self {
        let back = facing.opposite();
        let body = std::iter::successors(Some(head), |cell| Some(cell.moved(back)))
            .take(length)
            .collect();
        Snake { body }
    }

    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        Snake { body: cells.into_iter().collect() }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.body
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Whether moving the head onto `cell` bites the body. When not growing the
    /// tail vacates on the same step, so it is left out of the scan.
    pub fn bites(&self, cell: Cell, growing: bool) -> bool {
        let checked = if growing { self.body.len() } else { self.body.len() - 1 };
        self.body.iter().take(checked).any(|&c| c == cell)
    }

    /// Pushes a new head. Returns the vacated tail cell unless growing.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.insert(0, new_head);
        if grow {
            None
        } else {
            self.body.pop()
        }
    }

    /// True when no two segments share a cell.
    pub fn is_self_disjoint(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.body.len());
        self.body.iter().all(|c| seen.insert(*c))
    }
}
