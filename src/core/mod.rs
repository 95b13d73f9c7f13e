pub mod formula;
pub mod server;
pub mod shutdown;
