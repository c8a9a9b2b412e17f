/// Order placement endpoint.
pub mod order;
