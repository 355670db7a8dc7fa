use super::action::Direction;
use super::config::GameConfig;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// A point in continuous drawing space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothPoint {
    pub x: f32,
    pub y: f32,
}

impl SmoothPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the toroidal playing field.
///
/// Both axes wrap independently: leaving one edge re-enters on the opposite
/// edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    /// Size of one cell in continuous units
    pub cell_size: f32,
}

impl Grid {
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            cell_size,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.grid_width, config.grid_height, config.cell_size)
    }

    /// Folds any position back onto the grid
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Top-left corner of a cell in continuous units
    pub fn to_point(&self, pos: Position) -> SmoothPoint {
        SmoothPoint::new(pos.x as f32 * self.cell_size, pos.y as f32 * self.cell_size)
    }
}

/// One link of the chain: where it is on the grid and where it is drawn.
///
/// Keeping both coordinates in one value means the drawn chain can never
/// have a different length from the logical one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub cell: Position,
    pub point: SmoothPoint,
}

impl Segment {
    /// A segment drawn exactly on its cell
    pub fn at_rest(cell: Position, grid: &Grid) -> Self {
        Self {
            cell,
            point: grid.to_point(cell),
        }
    }
}

/// Result of advancing the snake one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The head entered a free cell
    Moved { head: Position },
    /// The head would have entered a cell held by the body; nothing changed
    Collided { at: Position },
}

impl MoveResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MoveResult::Moved { .. })
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    grid: Grid,
    /// Body segments, with head at index 0
    segments: Vec<Segment>,
    /// Direction of the last completed move
    direction: Direction,
    /// Direction the next move will take
    pending: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction.
    ///
    /// Extra segments are laid out behind the head, wrapping at the edges.
    /// A length of zero is treated as one.
    pub fn new(grid: Grid, head: Position, direction: Direction, length: usize) -> Self {
        let head = grid.wrap(head);
        let mut segments = vec![Segment::at_rest(head, &grid)];

        let back = direction.inverse();
        for i in 1..length.max(1) {
            let prev = segments[i - 1].cell;
            let cell = grid.wrap(prev.moved_in_direction(back));
            segments.push(Segment::at_rest(cell, &grid));
        }

        Self {
            grid,
            segments,
            direction,
            pending: direction,
        }
    }

    /// A single-segment snake in the middle of the grid, heading right
    pub fn centered(grid: Grid) -> Self {
        Self::new(grid, grid.center(), Direction::Right, 1)
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.segments[0].cell
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.segments[self.segments.len() - 1].cell
    }

    /// Body cells, head first
    pub fn body(&self) -> impl Iterator<Item = Position> + '_ {
        self.segments.iter().map(|s| s.cell)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// Direction the next move will take
    pub fn heading(&self) -> Direction {
        self.pending
    }

    /// Request a turn. A request for the exact reverse of the current
    /// direction is dropped.
    pub fn change_direction(&mut self, requested: Direction) {
        if requested.is_opposite(self.direction) {
            return;
        }
        self.pending = requested;
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.segments[1..].iter().any(|s| s.cell == pos)
    }

    /// Check if a position is occupied by any segment
    pub fn occupies(&self, pos: Position) -> bool {
        self.segments.iter().any(|s| s.cell == pos)
    }

    /// Advance one cell in the pending direction.
    ///
    /// Collision is tested against the body as it is before the move, so the
    /// cell the tail is about to leave still counts as occupied. On collision
    /// the snake is left untouched.
    pub fn move_forward(&mut self) -> MoveResult {
        let head = self.grid.wrap(self.head().moved_in_direction(self.pending));

        if self.collides_with_body(head) {
            return MoveResult::Collided { at: head };
        }

        self.direction = self.pending;

        // Cells shift one link towards the tail; drawn points stay with their
        // index and ease towards the new cell.
        for i in (1..self.segments.len()).rev() {
            self.segments[i].cell = self.segments[i - 1].cell;
        }
        self.segments[0].cell = head;

        MoveResult::Moved { head }
    }

    /// Append a copy of the tail segment
    pub fn grow(&mut self) {
        let tail = self.segments[self.segments.len() - 1];
        self.segments.push(tail);
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a snake has at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
