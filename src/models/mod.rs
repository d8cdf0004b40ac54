mod entities;
mod enums;
mod requests;

pub use entities::*;
pub use enums::*;
pub use requests::*;
