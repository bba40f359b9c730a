mod echo;
mod health;
mod identity;
mod not_found;
mod util;

pub use echo::echo;
pub use health::health;
pub use identity::{headers, ip, whoami};
pub use not_found::not_found;
pub use util::json_response;
