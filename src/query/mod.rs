pub mod filter;
pub mod window;

pub use filter::{Collection, Field, Filter, Sort, SqlFilter};
pub use window::Window;
