mod lstar;
pub use lstar::*;

pub(crate) mod oracle;
pub use oracle::*;

mod observationtable;
pub use observationtable::{Experiment, Inconsistency, ObservationTable, OutputRow};

pub mod strategy;
pub use strategy::{LearningStrategy, StrategyKind, StrategyParseError};
