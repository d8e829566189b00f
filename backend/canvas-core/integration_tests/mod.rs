mod boot;
mod connection;
mod helpers;
mod session;
