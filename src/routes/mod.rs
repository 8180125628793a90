mod health_check;
mod helpers;
mod home;
mod root;
mod sessions;

pub use health_check::*;
pub use home::*;
pub use root::*;
pub use sessions::*;
