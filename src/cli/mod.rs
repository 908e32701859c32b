mod root;
mod run;
mod schema;

pub use root::Cli;
pub use run::RunCommand;
pub use schema::SchemaCommand;
