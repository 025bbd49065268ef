pub mod run;
pub mod validate;

pub use run::RunCommands;
pub use validate::ValidateCommands;
