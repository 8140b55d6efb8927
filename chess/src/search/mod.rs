//! Move search
//!
//! [`MinMaxEval`] evaluates one root move with a depth-limited alpha-beta search. Strategies
//! evaluate all the root moves, sequentially or on a thread pool, and [`ComputerPlayer`] picks
//! one of the best.

pub mod best_response;
pub mod cancel;
pub mod config;
pub mod minmax;
pub mod player;
pub mod prune;
pub mod strategy;

pub use best_response::{BestResponses, ResponseTable, SharedBestResponses};
pub use cancel::CancelToken;
pub use config::{Concurrency, ConfigError, Difficulty, SearchConfig};
pub use minmax::MinMaxEval;
pub use player::ComputerPlayer;
pub use prune::{PlyInfo, PruneConfig, PrunePolicy, SearchWidth};
pub use strategy::{MultiThreaded, SearchParams, SharedBound, SingleThreaded, Strategy};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search cancelled")]
    Cancelled,
    #[error("no move was evaluated")]
    NoResults,
    #[error("cannot start thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
