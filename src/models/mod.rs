mod amount;
mod order;
mod product;

pub use amount::*;
pub use order::*;
pub use product::*;
