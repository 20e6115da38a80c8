pub mod events;
pub mod socket;
pub mod web;

pub use socket::SocketModeClient;
pub use web::SlackWebClient;
