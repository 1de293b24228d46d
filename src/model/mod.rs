pub mod market;
pub mod order;
pub mod record;
pub mod signal;
pub mod tick;
