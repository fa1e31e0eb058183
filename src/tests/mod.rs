//! Whole-pipeline scenarios
