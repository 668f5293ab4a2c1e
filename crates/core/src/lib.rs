pub mod enumerate;
pub mod error;
pub mod hypothesis;
pub mod infer;
pub mod joint;
pub mod model;
pub mod pedigree;
pub mod posterior;

pub use enumerate::{hypotheses, HypothesisIter, MAX_INDIVIDUALS};
pub use error::{HeredityError, Result};
pub use hypothesis::{GeneCount, Hypothesis};
pub use infer::{compute_posteriors, compute_posteriors_parallel};
pub use joint::joint_probability;
pub use model::ProbabilityModel;
pub use pedigree::{Individual, Pedigree};
pub use posterior::PosteriorTable;
