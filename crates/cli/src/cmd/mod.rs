mod boot;
mod info;
mod order;

pub use boot::cmd_boot;
pub use info::cmd_info;
pub use order::cmd_order;
