pub mod io;
pub mod roster;

pub use roster::read_roster_xlsx;
