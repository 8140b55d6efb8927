//! Evaluation of all the root moves
//!
//! Root moves are independent from each other except for two pieces of shared knowledge: the
//! best value found so far, which lets the search of other moves stop early, and the replies
//! that turned out to be the best, which are tried first.

use super::best_response::{BestResponses, SharedBestResponses};
use super::cancel::CancelToken;
use super::minmax::MinMaxEval;
use super::prune::PrunePolicy;
use super::SearchError;
use crate::eval::{EvaluatedMove, Evaluation, StaticEval};
use crate::game::ChessGame;
use crate::moves::Move;

use log::{debug, error, trace, warn};
use parking_lot::Mutex;
use std::any::Any;
use std::cmp::Reverse;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

/// Search settings shared by all the workers
#[derive(Copy, Clone)]
pub struct SearchParams<'a> {
    pub policy: &'a dyn PrunePolicy,
    pub eval: &'a dyn StaticEval,
    pub good_enough_radius: i32,
}

impl<'a> SearchParams<'a> {
    fn searcher(&self, cancel: CancelToken) -> MinMaxEval<'a> {
        MinMaxEval::new(self.policy, self.eval, self.good_enough_radius, cancel)
    }
}

/// Best value among the evaluated root moves
///
/// Only the aggregating thread updates it, workers read it before starting a new move.
#[derive(Debug, Default)]
pub struct SharedBound(Mutex<Option<Evaluation>>);

impl SharedBound {
    pub fn get(&self) -> Option<Evaluation> {
        *self.0.lock()
    }

    /// Replaces the bound if `value` is strictly better. Returns whether it was replaced
    pub fn offer(&self, value: Evaluation) -> bool {
        let mut cur = self.0.lock();
        if cur.map_or(true, |c| value > c) {
            *cur = Some(value);
            return true;
        }
        false
    }
}

pub trait Strategy {
    /// Evaluates `moves` in `game` and returns them sorted from the best one
    ///
    /// `progress` is called with the number of finished moves and the total number of moves.
    fn evaluate_moves(
        &self,
        game: &mut ChessGame,
        moves: &[Move],
        params: SearchParams<'_>,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<EvaluatedMove>, SearchError>;
}

fn sorted(mut results: Vec<(usize, EvaluatedMove)>) -> Vec<EvaluatedMove> {
    results.sort_by_key(|(idx, m)| (Reverse(m.evaluation), *idx));
    results.into_iter().map(|(_, m)| m).collect()
}

/// Evaluates the moves one by one on the calling thread
#[derive(Debug, Default, Copy, Clone)]
pub struct SingleThreaded;

impl Strategy for SingleThreaded {
    fn evaluate_moves(
        &self,
        game: &mut ChessGame,
        moves: &[Move],
        params: SearchParams<'_>,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<EvaluatedMove>, SearchError> {
        let started = Instant::now();
        let mut searcher = params.searcher(cancel.clone());
        let mut responses = BestResponses::new();
        let mut bound = None;
        let mut results = Vec::with_capacity(moves.len());
        for (idx, &mv) in moves.iter().enumerate() {
            let (best_reply, evaluation) =
                match searcher.evaluate_move(game, mv, bound, &responses.sorted()) {
                    Ok(res) => res,
                    Err(e) => {
                        warn!("search stopped after {} of {} moves: {}", idx, moves.len(), e);
                        return Err(e);
                    }
                };
            trace!("{}: {}", mv, evaluation);
            if bound.map_or(true, |b| evaluation > b) {
                bound = Some(evaluation);
            }
            if let Some(reply) = best_reply {
                responses.add(reply);
            }
            results.push((
                idx,
                EvaluatedMove {
                    mv,
                    evaluation,
                    best_reply,
                },
            ));
            progress(idx + 1, moves.len());
        }
        debug!(
            "evaluated {} moves in {:?}, {} nodes",
            moves.len(),
            started.elapsed(),
            searcher.nodes()
        );
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(sorted(results))
    }
}

/// Evaluates the moves on a pool of `threads` workers
///
/// Every worker gets its own copy of the game and takes the next unevaluated move from a shared
/// counter. Results go to the calling thread, which keeps the shared bound and hints up to date
/// and reports progress.
///
/// A move whose evaluation panics is logged and left out of the results.
#[derive(Debug, Copy, Clone)]
pub struct MultiThreaded {
    pub threads: usize,
}

enum TaskResult {
    Done(usize, EvaluatedMove),
    Failed(usize, String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

impl Strategy for MultiThreaded {
    fn evaluate_moves(
        &self,
        game: &mut ChessGame,
        moves: &[Move],
        params: SearchParams<'_>,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<EvaluatedMove>, SearchError> {
        let started = Instant::now();
        let total = moves.len();
        let workers = self.threads.min(total).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("kibitz-search-{}", i))
            .build()?;
        debug!("evaluating {} moves on {} threads", total, workers);

        let games = game.copy_game(workers);
        let next = AtomicUsize::new(0);
        let bound = SharedBound::default();
        let responses = SharedBestResponses::new();
        let (tx, rx) = mpsc::channel();
        let mut results = Vec::with_capacity(total);

        pool.in_place_scope(|s| {
            for pristine in games {
                let tx = tx.clone();
                let (next, bound, responses) = (&next, &bound, &responses);
                let cancel = cancel.clone();
                s.spawn(move |_| {
                    let mut game = pristine.clone();
                    let mut searcher = params.searcher(cancel);
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        if idx >= total {
                            break;
                        }
                        let mv = moves[idx];
                        let hints = responses.sorted();
                        let res = panic::catch_unwind(AssertUnwindSafe(|| {
                            searcher.evaluate_move(&mut game, mv, bound.get(), &hints)
                        }));
                        let msg = match res {
                            Ok(Ok((best_reply, evaluation))) => TaskResult::Done(
                                idx,
                                EvaluatedMove {
                                    mv,
                                    evaluation,
                                    best_reply,
                                },
                            ),
                            Ok(Err(_)) => break,
                            Err(payload) => {
                                // A panic outside of the move guard may leave the copy broken
                                game = pristine.clone();
                                TaskResult::Failed(idx, panic_message(&*payload))
                            }
                        };
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            let mut finished = 0;
            for msg in rx {
                finished += 1;
                match msg {
                    TaskResult::Done(idx, m) => {
                        trace!("{}: {}", m.mv, m.evaluation);
                        bound.offer(m.evaluation);
                        if let Some(reply) = m.best_reply {
                            responses.add(reply);
                        }
                        results.push((idx, m));
                    }
                    TaskResult::Failed(idx, message) => {
                        error!("evaluation of {} panicked: {}", moves[idx], message);
                    }
                }
                progress(finished, total);
            }
        });

        if cancel.is_cancelled() {
            warn!("search cancelled after {} of {} moves", results.len(), total);
            return Err(SearchError::Cancelled);
        }
        debug!(
            "evaluated {} of {} moves in {:?}",
            results.len(),
            total,
            started.elapsed()
        );
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(sorted(results))
    }
}
