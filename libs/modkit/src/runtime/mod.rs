mod server;
mod shutdown;

pub use server::serve;
pub use shutdown::wait_for_shutdown;
