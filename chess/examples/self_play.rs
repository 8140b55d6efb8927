// Computer plays against itself
//
// Usage: self_play [DIFFICULTY [START]]
// DIFFICULTY is 1, 2 or 3. START is `classic`, `chess960 <index>` or a position dump.
// Set RUST_LOG=debug to see the search log.

use kibitz::{
    search::{CancelToken, Concurrency, Difficulty, SearchConfig},
    ChessGame, ComputerPlayer, StartConfig,
};
use std::env;
use std::error::Error;
use std::str::FromStr;

const MAX_MOVES: usize = 300;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (difficulty, start) = match args.as_slice() {
        [] => ("2", "classic".to_string()),
        [difficulty] => (difficulty.as_str(), "classic".to_string()),
        [difficulty, start @ ..] => (difficulty.as_str(), start.join(" ")),
    };
    let start = StartConfig::from_str(&start)?;
    let config = SearchConfig::new(Difficulty::from_str(difficulty)?)
        .with_concurrency(Concurrency::available())
        .with_randomness(10, 1);
    let mut player = ComputerPlayer::new(config)?;
    let mut game = ChessGame::new(&start)?;

    let cancel = CancelToken::new();
    let mut state = game.state();
    while !state.is_over() && game.board().history().len() < MAX_MOVES {
        let chosen = player.choose_move(&mut game, &cancel, &mut |_, _| {})?;
        println!("{}: {} ({})", game.side(), chosen.mv, chosen.evaluation);
        state = game.make_move(chosen.mv);
        println!("{}", game);
    }

    println!();
    println!("Result: {}", state);
    println!("Moves: {}", game.complete_history());
    Ok(())
}
