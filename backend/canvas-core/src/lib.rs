pub mod boot;
pub mod config;
pub mod connection;
pub mod error;
pub mod host;
pub mod markdown;
pub mod present;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod tests;

pub const CANVAS_SERVER_HOSTNAME: &str = "127.0.0.1";
pub const CANVAS_SERVER_PORT: u16 = 8787;
pub const CANVAS_SERVER_BASE_URL: &str =
    const_format::concatcp!("http://", CANVAS_SERVER_HOSTNAME, ":", CANVAS_SERVER_PORT);
