/// Inline keyboard actions and their callback encoding
pub mod actions;
/// Command and message handlers
pub mod handlers;
/// Outbound chat transport
pub mod transport;
/// User-facing texts and keyboards
pub mod views;

pub use handlers::ResourceDesk;
