//! Attribution ranking and natural-language explanations.

mod compose;
mod rank;

pub use compose::{Explanation, ExplanationComposer};
pub use rank::{rank, Contribution, RankError, RankedAttribution};
