// Domain layer module exports
//
// The domain is the uploaded dataset: parsing, column typing, and the
// upload invariants. It is independent of the HTTP and agent layers.

pub mod dataset;
