pub mod reconciler;
pub mod similarity;
