// Allotment core. Everything in here is a pure, synchronous function over
// its full input: matrix computation, caste merging, slot allocation and
// branch ranks. Persistence and HTTP live elsewhere.

pub mod allocate;
pub mod matrix;
pub mod merge;
pub mod ranks;

pub use allocate::{Allocation, WAITING, enumerate_slots};
pub use matrix::{MatrixComputation, compute_seat_matrix, split_by_percentage, split_by_weight};
pub use merge::{
    collapse_branch_entry, expand_branch_entry, expand_group, group_total, matrix_from_document,
    matrix_to_document, merge_castes, unmerge_castes,
};
pub use ranks::assign_branch_ranks;
