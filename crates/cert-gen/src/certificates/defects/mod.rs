//! Defect classification and certificate text rendering, English and Welsh.

mod classifier;
mod format;
mod welsh;

pub use classifier::{classify, DefectBucket, DefectBuckets, WelshRendering};
pub use format::{format_defect, format_defect_welsh};
pub use welsh::{fetch_flat_defects, find_flat_defect, flatten_defects, translate_location, FlatDefect};
