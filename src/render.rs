use crate::{Coords, TermInt};
use crate::state::{Board, Direction, Point, Snapshot};
use crate::term::TermManager;

use crossterm::style::Color;
use crossterm::Result;

const SNAKE_BODY_CHAR: char = '█';
const TRAIL_CHAR: char = '·';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

const FADE_STEP: f32 = 0.05;

// Playfield cell (0, 0) lands inside the border, below the status line
const ORIGIN_X: TermInt = 1;
const ORIGIN_Y: TermInt = 2;

/// Decaying game-over alpha, 1.0 to 0.0 in fixed steps. Presentation
/// state only; the simulation never sees it.
pub struct Fade {
    alpha: f32,
}

impl Fade {
    fn new() -> Self {
        Fade { alpha: 0.0 }
    }

    pub fn restart(&mut self) {
        self.alpha = 1.0;
    }

    pub fn step(&mut self) -> f32 {
        self.alpha = (self.alpha - FADE_STEP).max(0.0);
        self.alpha
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_done(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Paints GameState snapshots onto the terminal. Tracks the cells it
/// drew last frame so each frame only touches what changed.
pub struct Renderer {
    board: Board,
    prev: Vec<Coords>,
    fade: Fade,
}

impl Renderer {
    pub fn new(board: Board) -> Self {
        Renderer { board, prev: vec![], fade: Fade::new() }
    }

    /// Minimum terminal size: the grid, its border, and the status line.
    pub fn required_size(&self) -> Coords {
        (self.board.cells_x() as TermInt + 2, self.board.cells_y() as TermInt + 3)
    }

    pub fn draw_start_screen(&mut self, term: &mut TermManager) -> Result<()> {
        term.clear()?;
        term.show_message(&[
            "S N A K E",
            "",
            "Arrow keys or WASD to move",
            "SPACE to start",
            "q, Esc or CTRL+C to quit",
        ])
    }

    /// Clears the screen and draws the static chrome plus the first frame.
    pub fn begin_run(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        term.clear()?;
        self.prev.clear();
        self.draw_border(term)?;
        self.draw_frame(term, snap)
    }

    pub fn draw_frame(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        for pos in std::mem::take(&mut self.prev) {
            term.print_at(pos, ' ')?;
        }

        let food = self.cell(snap.food);
        term.print_at(food, FOOD_CHAR)?;
        self.prev.push(food);

        // Body overdraws the trail where they still overlap
        for p in snap.trail.iter() {
            let pos = self.cell(p);
            term.print_colored_at(pos, TRAIL_CHAR, Color::DarkGrey)?;
            self.prev.push(pos);
        }

        for (i, p) in snap.body.iter().enumerate() {
            let pos = self.cell(*p);
            let ch = if i == 0 { head_char(snap.direction) } else { SNAKE_BODY_CHAR };
            term.print_at(pos, ch)?;
            self.prev.push(pos);
        }

        self.draw_status(term, snap)?;
        term.flush()
    }

    /// Entry into the game-over display: the body turns into bright red
    /// X's that fade out tick by tick before the score box appears.
    pub fn enter_game_over(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        self.fade.restart();
        self.draw_dead_snake(term, snap)?;
        self.draw_status(term, snap)?;
        term.flush()
    }

    /// One fade step per tick interval; shows the score box once the
    /// alpha has decayed to zero.
    pub fn step_game_over(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        if self.fade.is_done() {
            return Ok(());
        }
        self.fade.step();
        self.draw_dead_snake(term, snap)?;
        term.flush()?;

        if self.fade.is_done() {
            let score = format!("Score: {}", snap.score);
            let high = format!("High score: {}", snap.high_score);
            term.show_message(&[
                "Game over!",
                &*score,
                &*high,
                "",
                "SPACE to play again,",
                "q, Esc or CTRL+C to quit",
            ])?;
        }
        Ok(())
    }

    fn draw_dead_snake(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        let red = (self.fade.alpha() * 255.0) as u8;
        for p in snap.body {
            term.print_colored_at(self.cell(*p), DEAD_SNAKE_CHAR, Color::Rgb { r: red, g: 0, b: 0 })?;
        }
        Ok(())
    }

    fn draw_status(&mut self, term: &mut TermManager, snap: &Snapshot) -> Result<()> {
        let line = format!("Score: {:<6} High score: {}", snap.score, snap.high_score);
        term.print_text_at((0, 0), &line)
    }

    fn draw_border(&mut self, term: &mut TermManager) -> Result<()> {
        let width = self.board.cells_x() as TermInt + 2;
        let height = self.board.cells_y() as TermInt + 2;
        let top = ORIGIN_Y - 1;

        for x in 0..width {
            let ch = if x == 0 || x == width - 1 { '+' } else { '-' };
            term.print_at((x, top), ch)?;
            term.print_at((x, top + height - 1), ch)?;
        }
        for y in 1..height - 1 {
            term.print_at((0, top + y), '|')?;
            term.print_at((width - 1, top + y), '|')?;
        }
        term.flush()
    }

    fn cell(&self, p: Point) -> Coords {
        (
            (p.x / self.board.cell) as TermInt + ORIGIN_X,
            (p.y / self.board.cell) as TermInt + ORIGIN_Y,
        )
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_decays_in_fixed_steps_and_clamps() {
        let mut fade = Fade::new();
        fade.restart();
        assert!((fade.alpha() - 1.0).abs() < f32::EPSILON);

        fade.step();
        assert!((fade.alpha() - 0.95).abs() < 1e-6);

        for _ in 0..30 {
            fade.step();
        }
        assert_eq!(fade.alpha(), 0.0);
        assert!(fade.is_done());
    }

    #[test]
    fn fade_restart_resets_to_opaque() {
        let mut fade = Fade::new();
        fade.restart();
        for _ in 0..25 {
            fade.step();
        }
        assert!(fade.is_done());

        fade.restart();
        assert!(!fade.is_done());
        assert!((fade.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn playfield_cells_map_inside_the_border() {
        let r = Renderer::new(Board::standard());
        assert_eq!(r.cell(Point::new(0, 0)), (1, 2));
        assert_eq!(r.cell(Point::new(100, 100)), (6, 7));
        assert_eq!(r.cell(Point::new(580, 580)), (30, 31));
    }

    #[test]
    fn required_size_covers_grid_border_and_status() {
        let r = Renderer::new(Board::standard());
        assert_eq!(r.required_size(), (32, 33));
    }
}
