mod offer;
mod product;
mod staff;

pub use offer::*;
pub use product::*;
pub use staff::*;
