pub mod ports;
pub mod history;
pub mod tools;
pub mod markers;
pub mod files;
pub mod dispatcher;
pub mod keyword;
pub mod runtime;

#[cfg(test)]
mod tests;
