//! Feature Engineering
//!
//! Assembles the fixed-order feature vector consumed by the scaler and
//! classifier, including the two derived interaction terms.

mod features;

pub use features::{FeatureAssembler, FeatureVector, FEATURE_DIMENSION};
