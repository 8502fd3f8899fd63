//! Building blocks of the `xmlflatctl` command-line tool.

pub mod cmd_check;
pub mod cmd_columns;
pub mod cmd_extract;
pub mod common;
