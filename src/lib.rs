#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

pub mod config;
pub mod driver;
pub mod io;
pub mod lang;
pub mod logging;
pub mod oracle;
pub mod syntax;
pub mod utils;
