use super::cancel::CancelToken;
use super::config::{ConfigError, SearchConfig};
use super::strategy::{SearchParams, Strategy};
use super::SearchError;
use crate::eval::{EvaluatedMove, MaterialEval, StaticEval};
use crate::game::ChessGame;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Engine that picks a move for the side to move
pub struct ComputerPlayer {
    config: SearchConfig,
    strategy: Box<dyn Strategy>,
    eval: Box<dyn StaticEval>,
    rng: StdRng,
}

impl ComputerPlayer {
    pub fn new(config: SearchConfig) -> Result<ComputerPlayer, ConfigError> {
        ComputerPlayer::with_eval(config, Box::new(MaterialEval))
    }

    pub fn with_eval(
        config: SearchConfig,
        eval: Box<dyn StaticEval>,
    ) -> Result<ComputerPlayer, ConfigError> {
        config.validate()?;
        Ok(ComputerPlayer {
            config,
            strategy: config.strategy(),
            eval,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Evaluates every legal move in `game`, best first
    pub fn evaluate_all(
        &self,
        game: &mut ChessGame,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<EvaluatedMove>, SearchError> {
        let moves = game.legal_moves();
        let params = SearchParams {
            policy: &self.config.prune,
            eval: self.eval.as_ref(),
            good_enough_radius: self.config.good_enough_radius,
        };
        self.strategy
            .evaluate_moves(game, &moves, params, cancel, progress)
    }

    /// Picks a move in `game`
    ///
    /// With a positive randomness, any ongoing move whose score is close enough to the best one
    /// may be picked.
    pub fn choose_move(
        &mut self,
        game: &mut ChessGame,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<EvaluatedMove, SearchError> {
        let results = self.evaluate_all(game, cancel, progress)?;
        let best = results[0];
        let candidates: Vec<_> = match best.evaluation.score() {
            Some(top) if self.config.randomness > 0 => results
                .iter()
                .filter(|m| {
                    m.evaluation
                        .score()
                        .map_or(false, |s| top.primary - s.primary <= self.config.randomness)
                })
                .collect(),
            _ => vec![&best],
        };
        let chosen = *candidates[self.rng.gen_range(0..candidates.len())];
        debug!(
            "{} candidates within {} of {}",
            candidates.len(),
            self.config.randomness,
            best.evaluation
        );
        info!("{} plays {} ({})", game.side(), chosen.mv, chosen.evaluation);
        Ok(chosen)
    }
}
