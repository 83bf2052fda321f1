pub mod intake;
pub mod projection;
