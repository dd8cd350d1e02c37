mod change;
mod error;
mod projection;
mod selection;
mod settings;
mod sort;
mod sync;
mod tree;
mod view;

pub use change::*;
pub use error::*;
pub use projection::*;
pub use selection::*;
pub use settings::*;
pub use sort::*;
pub use sync::*;
pub use tree::*;
pub use view::*;
