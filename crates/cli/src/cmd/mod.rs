mod check;
mod generate;
mod init;

pub use check::cmd_check;
pub use generate::cmd_generate;
pub use init::cmd_init;
