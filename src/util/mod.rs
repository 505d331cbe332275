//! More-or-less general-purpose utility functions.

pub mod name;
pub mod namers;

pub use self::name::SafeName;
pub use self::namers::UniqueNamer;
