//! Host application bridge.
//!
//! The host embeds the canvas surface and supplies the init data used for the
//! one-time authentication exchange. The only action flowing back is a
//! fire-and-forget request to close the surface, used by the fatal
//! authentication-failure placeholder.

pub trait HostBridge: Send + Sync {
    /// Opaque init data supplied by the host at boot.
    fn init_data(&self) -> String;

    /// Ask the host to close the surface. Fire-and-forget.
    fn close(&self);
}
