mod achievement;
mod category;
mod game;
mod post;
mod run;
mod runner;
mod team;

pub use achievement::*;
pub use category::*;
pub use game::*;
pub use post::*;
pub use run::*;
pub use runner::*;
pub use team::*;
