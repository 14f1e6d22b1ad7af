//! Payment provider adapters.

mod adapter;
mod mock;

pub use adapter::{RazorpayConfig, RazorpayOrderGateway};
pub use mock::MockOrderGateway;
