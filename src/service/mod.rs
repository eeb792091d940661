pub mod gateway;
pub mod session;
pub mod session_actor;
