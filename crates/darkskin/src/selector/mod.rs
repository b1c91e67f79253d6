//! Selector classification.

mod classify;

pub use classify::{
    CLASSIFIER_RULES, ClassifierRule, ElementType, HOST_MANAGED_MARKER, classify, is_host_managed,
};
