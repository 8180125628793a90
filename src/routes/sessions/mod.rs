mod create;
mod destroy;
mod form;
mod new;

pub use create::*;
pub use destroy::*;
pub use new::*;
