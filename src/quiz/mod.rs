mod city;
mod error;
mod registry;
mod session;

pub use city::{CityConfig, CityTable};
pub use error::{LoadError, QuizError};
pub use registry::QuizRegistry;
pub use session::{QuizSession, QuizState, REVEAL_MS};
