pub mod helpers;
pub mod http_client;
pub mod stub;

pub use helpers::*;
pub use http_client::*;
pub use stub::*;
