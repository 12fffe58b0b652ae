#[macro_use]
mod macros;
mod cli;
pub mod dbf;
mod error;
mod utils;

pub type Result<T> = std::result::Result<T, Error>;
pub use cli::{Cli, Command};
pub use dbf::{
    decode, decode_with, encode, read_path, write_path, write_path_dated, BlankNumeric,
    DecodeOptions, FieldDescriptor, FieldType, Header, Record, Table, Value,
};
pub use error::Error;
