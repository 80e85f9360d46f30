mod eta;
mod health;
mod reload;

pub use eta::*;
pub use health::*;
pub use reload::*;
