//! Theme settings schema handling.

pub mod merge;

pub use merge::{
    SchemaMerge, SchemaMergeError, append_if_absent, count_named, merge_fragment,
    parse_aggregate,
};
