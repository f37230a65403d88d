//! GradKit core: a minimal reverse-mode autodiff engine and the training
//! kernel built on it.
//!
//! The pieces, leaves first: [`Tensor`] (a value plus its provenance in a
//! dynamically built computation graph), the autograd engine
//! ([`autograd`]), differentiable operations ([`ops`]), network building
//! blocks ([`nn`]), the SGD optimizer ([`optim`]) and the training loop
//! ([`train`]). Batch loading lives in the companion `gradkit-data` crate.

pub mod autograd;
pub mod error;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;
pub mod train;

// Re-export the central types at the crate root.
pub use error::GradKitError;
pub use tensor::Tensor;
