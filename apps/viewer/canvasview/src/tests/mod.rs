mod bridge;
mod logger;
mod surface;
