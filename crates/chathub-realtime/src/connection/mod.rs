//! Connection lifecycle: handles, pool, and the setup/teardown gateway.

pub mod gateway;
pub mod handle;
pub mod pool;
