mod game;
mod render;
mod state;
mod term;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use game::Game;
use state::{Board, GameState};
use term::TermManager;

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

const TICK_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> crossterm::Result<()> {
    let term = TermManager::new()?;
    let state = GameState::new(Board::standard());
    let rng = StdRng::from_entropy();

    let mut game = Game::new(state, term, rng, TICK_INTERVAL)?;
    game.run()
}
