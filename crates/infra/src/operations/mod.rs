//! Named, context-annotated wrappers for remote management calls.

pub mod cloudfront;

pub use cloudfront::CloudFrontOperations;
