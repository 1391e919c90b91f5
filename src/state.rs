use rand::Rng;

use Direction::*;
use Phase::*;

pub const INITIAL_SNAKE_LENGTH: usize = 6;
const TRAIL_CAPACITY: usize = 10;

/// A playfield position. Coordinates are always multiples of the board's
/// cell size while the point is on the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit displacement in cell-size multiples.
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
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    GameOver,
}

/// Playfield constants, fixed at construction.
#[derive(Copy, Clone)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub cell: i32,
    pub start: Point,
}

impl Board {
    /// The reference playfield: 600x600 units in cells of 20 (a 30x30
    /// grid), with the head starting at (100, 100).
    pub fn standard() -> Self {
        Board { width: 600, height: 600, cell: 20, start: Point::new(100, 100) }
    }

    pub fn cells_x(&self) -> i32 {
        self.width / self.cell
    }

    pub fn cells_y(&self) -> i32 {
        self.height / self.cell
    }

    pub fn cell_count(&self) -> usize {
        (self.cells_x() * self.cells_y()) as usize
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    // Uniform over the whole grid, occupied cells included. The reference
    // implementation performs no exclusion check and food landing on the
    // snake is accepted behavior.
    fn random_cell<R: Rng>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.gen_range(0..self.cells_x()) * self.cell,
            rng.gen_range(0..self.cells_y()) * self.cell,
        )
    }
}

/// Fixed-capacity ring buffer over the last few pre-move head positions,
/// consumed by the renderer for the trail effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    cells: [Point; TRAIL_CAPACITY],
    start: usize,
    len: usize,
}

impl Trail {
    fn new() -> Self {
        Trail { cells: [Point::new(0, 0); TRAIL_CAPACITY], start: 0, len: 0 }
    }

    fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    fn push(&mut self, p: Point) {
        if self.len == TRAIL_CAPACITY {
            // Full: overwrite the oldest entry
            self.cells[self.start] = p;
            self.start = (self.start + 1) % TRAIL_CAPACITY;
        } else {
            self.cells[(self.start + self.len) % TRAIL_CAPACITY] = p;
            self.len += 1;
        }
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len).map(move |i| self.cells[(self.start + i) % TRAIL_CAPACITY])
    }
}

/// What a single tick did, for the caller's rendering decisions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub phase: Phase,
    pub ate_food: bool,
}

/// Read-only view of the simulation for the renderer.
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub direction: Direction,
    pub body: &'a [Point],
    pub trail: &'a Trail,
    pub food: Point,
    pub score: u32,
    pub high_score: u32,
}

/// The authoritative simulation. Owns no I/O; randomness is injected by
/// the caller so runs are deterministic given the seed.
pub struct GameState {
    board: Board,
    // Pre-sized to the grid cell count so growth never reallocates; only
    // [0, body_parts) is meaningful. Segment 0 is the head.
    body: Vec<Point>,
    body_parts: usize,
    direction: Direction,
    pending: Option<Direction>,
    trail: Trail,
    food: Point,
    score: u32,
    high_score: u32,
    phase: Phase,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        GameState {
            board,
            body: vec![Point::new(0, 0); board.cell_count()],
            body_parts: 0,
            direction: Right,
            pending: None,
            trail: Trail::new(),
            food: Point::new(0, 0),
            score: 0,
            high_score: 0,
            phase: NotStarted,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            direction: self.direction,
            body: &self.body[..self.body_parts],
            trail: &self.trail,
            food: self.food,
            score: self.score,
            high_score: self.high_score,
        }
    }

    /// Begins a fresh run: default-length snake laid out horizontally
    /// leftwards from the board's start cell, facing Right. The high
    /// score carries over.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.body_parts = INITIAL_SNAKE_LENGTH;
        for i in 0..self.body_parts {
            self.body[i] =
                Point::new(self.board.start.x - i as i32 * self.board.cell, self.board.start.y);
        }
        self.direction = Right;
        self.pending = None;
        self.trail.clear();
        self.score = 0;
        self.phase = Running;
        self.food = self.board.random_cell(rng);
    }

    /// NotStarted -> Running. No-op in any other phase.
    pub fn request_start<R: Rng>(&mut self, rng: &mut R) {
        if self.phase == NotStarted {
            self.reset(rng);
        }
    }

    /// GameOver -> Running. No-op in any other phase.
    pub fn request_restart<R: Rng>(&mut self, rng: &mut R) {
        if self.phase == GameOver {
            self.reset(rng);
        }
    }

    /// Records the intended direction for the next tick. Silently
    /// rejected when it reverses the current direction or the game is
    /// not running; the last accepted write before a tick wins.
    pub fn set_direction(&mut self, d: Direction) {
        if self.phase != Running || d == self.direction.opposite() {
            return;
        }
        self.pending = Some(d);
    }

    /// Advances the simulation one step. A no-op unless Running: once the
    /// phase is GameOver the state is frozen until a restart.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickOutcome {
        if self.phase != Running {
            return TickOutcome { phase: self.phase, ate_food: false };
        }

        if let Some(d) = self.pending.take() {
            self.direction = d;
        }

        self.trail.push(self.body[0]);
        let old_tail = self.body[self.body_parts - 1];

        // Shift tail to head, then advance the head one cell
        for i in (1..self.body_parts).rev() {
            self.body[i] = self.body[i - 1];
        }
        let (dx, dy) = self.direction.delta();
        let head = Point::new(
            self.body[0].x + dx * self.board.cell,
            self.body[0].y + dy * self.board.cell,
        );
        self.body[0] = head;

        // Walls first, then self
        if !self.board.contains(head) || self.body[1..self.body_parts].contains(&head) {
            self.phase = GameOver;
            return TickOutcome { phase: GameOver, ate_food: false };
        }

        let mut ate_food = false;
        if head == self.food {
            ate_food = true;
            self.score += 1;
            if self.high_score < self.score {
                self.high_score = self.score;
            }
            // Grow by re-occupying the cell the tail just vacated. At
            // grid capacity the hit still scores but cannot grow.
            if self.body_parts < self.body.len() {
                self.body[self.body_parts] = old_tail;
                self.body_parts += 1;
            }
            self.food = self.board.random_cell(rng);
        }

        TickOutcome { phase: Running, ate_food }
    }

    #[cfg(test)]
    fn place_food(&mut self, p: Point) {
        self.food = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started() -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = GameState::new(Board::standard());
        state.request_start(&mut rng);
        (state, rng)
    }

    #[test]
    fn starts_fresh_with_default_snake() {
        let (state, _) = started();
        let snap = state.snapshot();

        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.body.len(), INITIAL_SNAKE_LENGTH);
        assert_eq!(snap.body[0], Point::new(100, 100));
        assert_eq!(snap.body[5], Point::new(0, 100));
        // Laid out horizontally, no overlaps
        for (i, seg) in snap.body.iter().enumerate() {
            assert_eq!(*seg, Point::new(100 - i as i32 * 20, 100));
            assert!(state.board().contains(*seg));
        }
    }

    #[test]
    fn tick_is_a_pure_shift_plus_head_advance() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));
        let before: Vec<Point> = state.snapshot().body.to_vec();

        state.tick(&mut rng);
        let snap = state.snapshot();

        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.body.len(), before.len());
        assert_eq!(snap.body[0], Point::new(120, 100));
        for i in 1..snap.body.len() {
            assert_eq!(snap.body[i], before[i - 1]);
        }
    }

    #[test]
    fn eating_food_grows_scores_and_respawns() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(120, 100));
        let old_tail = *state.snapshot().body.last().unwrap();

        let out = state.tick(&mut rng);

        assert!(out.ate_food);
        let snap = state.snapshot();
        assert_eq!(snap.score, 1);
        assert_eq!(snap.high_score, 1);
        assert_eq!(snap.body.len(), INITIAL_SNAKE_LENGTH + 1);
        // The new segment re-occupies the vacated tail cell, leaving no gap
        assert_eq!(*snap.body.last().unwrap(), old_tail);
        assert!(state.board().contains(snap.food));
    }

    #[test]
    fn length_changes_only_on_food_ticks() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        let mut len = state.snapshot().body.len();
        for _ in 0..10 {
            let out = state.tick(&mut rng);
            let now = state.snapshot().body.len();
            if out.ate_food {
                assert_eq!(now, len + 1);
            } else {
                assert_eq!(now, len);
            }
            len = now;
        }
    }

    #[test]
    fn reversing_direction_is_rejected() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        state.set_direction(Direction::Left); // reverse of Right
        state.tick(&mut rng);

        assert_eq!(state.snapshot().direction, Direction::Right);
        assert_eq!(state.snapshot().body[0], Point::new(120, 100));
    }

    #[test]
    fn up_while_moving_down_keeps_moving_down() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));
        state.set_direction(Direction::Down);
        state.tick(&mut rng);
        assert_eq!(state.snapshot().direction, Direction::Down);

        state.set_direction(Direction::Up);
        state.tick(&mut rng);

        assert_eq!(state.snapshot().direction, Direction::Down);
        assert_eq!(state.snapshot().body[0], Point::new(100, 140));
    }

    #[test]
    fn last_direction_write_before_a_tick_wins() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        state.set_direction(Direction::Up);
        state.set_direction(Direction::Down);
        state.tick(&mut rng);

        assert_eq!(state.snapshot().direction, Direction::Down);
    }

    #[test]
    fn hitting_the_right_wall_ends_the_game() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        // Head starts at x=100 facing Right; 24 ticks reach x=580
        for _ in 0..24 {
            let out = state.tick(&mut rng);
            assert_eq!(out.phase, Phase::Running);
        }
        assert_eq!(state.snapshot().body[0], Point::new(580, 100));

        // The 25th step would put the head at x=600, out of bounds
        let out = state.tick(&mut rng);
        assert_eq!(out.phase, Phase::GameOver);
        assert_eq!(state.snapshot().phase, Phase::GameOver);
    }

    #[test]
    fn running_into_own_body_ends_the_game() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        // Right -> Down -> Left -> Up loops the head back into segment 3
        state.set_direction(Direction::Down);
        state.tick(&mut rng);
        state.set_direction(Direction::Left);
        state.tick(&mut rng);
        state.set_direction(Direction::Up);
        let out = state.tick(&mut rng);

        assert_eq!(out.phase, Phase::GameOver);
    }

    #[test]
    fn game_over_freezes_the_state() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));
        while state.snapshot().phase == Phase::Running {
            state.tick(&mut rng);
        }

        let body: Vec<Point> = state.snapshot().body.to_vec();
        let (food, score) = (state.snapshot().food, state.snapshot().score);

        let out = state.tick(&mut rng);

        assert_eq!(out, TickOutcome { phase: Phase::GameOver, ate_food: false });
        assert_eq!(state.snapshot().body, &body[..]);
        assert_eq!(state.snapshot().food, food);
        assert_eq!(state.snapshot().score, score);
    }

    #[test]
    fn direction_input_ignored_when_not_running() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = GameState::new(Board::standard());

        state.set_direction(Direction::Down);
        state.request_start(&mut rng);
        state.tick(&mut rng);

        // The pre-start press left no pending intent behind
        assert_eq!(state.snapshot().direction, Direction::Right);
    }

    #[test]
    fn high_score_survives_restarts() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(120, 100));
        state.tick(&mut rng);
        assert_eq!(state.snapshot().high_score, 1);
        state.place_food(Point::new(580, 580));

        // Crash into the left wall, then restart
        state.set_direction(Direction::Down);
        state.tick(&mut rng);
        state.set_direction(Direction::Left);
        while state.snapshot().phase == Phase::Running {
            state.tick(&mut rng);
        }
        state.request_restart(&mut rng);

        let snap = state.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.high_score, 1);
        assert_eq!(snap.body.len(), INITIAL_SNAKE_LENGTH);
    }

    #[test]
    fn restart_only_applies_from_game_over() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));
        state.tick(&mut rng);
        let head = state.snapshot().body[0];

        state.request_restart(&mut rng);

        // Still mid-run, nothing was reset
        assert_eq!(state.snapshot().body[0], head);
    }

    #[test]
    fn food_spawns_anywhere_on_the_grid() {
        // The reference behavior performs no occupied-cell exclusion, so a
        // spawn may land on the snake. On a 6x2-cell board the snake fills
        // the whole top row, so repeated spawns are bound to hit it.
        let board = Board {
            width: 120,
            height: 40,
            cell: 20,
            start: Point::new(100, 0),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GameState::new(board);
        state.request_start(&mut rng);

        let mut landed_on_body = false;
        for _ in 0..64 {
            state.reset(&mut rng);
            let snap = state.snapshot();
            assert!(state.board().contains(snap.food));
            if snap.body.contains(&snap.food) {
                landed_on_body = true;
            }
        }
        assert!(landed_on_body);
    }

    #[test]
    fn trail_holds_the_last_ten_head_positions() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));

        for _ in 0..12 {
            state.tick(&mut rng);
        }

        let snap = state.snapshot();
        assert_eq!(snap.trail.iter().count(), 10);
        // 12 ticks pushed heads at x=100..=320; the two oldest are gone
        let cells: Vec<Point> = snap.trail.iter().collect();
        assert_eq!(cells[0], Point::new(140, 100));
        assert_eq!(cells[9], Point::new(320, 100));
    }

    #[test]
    fn trail_clears_on_reset() {
        let (mut state, mut rng) = started();
        state.place_food(Point::new(0, 0));
        for _ in 0..5 {
            state.tick(&mut rng);
        }
        assert!(state.snapshot().trail.iter().count() > 0);

        state.reset(&mut rng);
        assert_eq!(state.snapshot().trail.iter().count(), 0);
    }
}
