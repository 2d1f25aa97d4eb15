use crate::render::Framebuffer;

/// Services the host provides to the client core.
pub trait Platform {
    /// Sends one datagram, returning how many bytes went out. Anything
    /// short of `data.len()` is treated as a dead transport.
    fn send_datagram(&mut self, data: &[u8]) -> usize;

    /// Monotonic wall clock in seconds.
    fn now(&self) -> f64;

    fn present(&mut self, framebuffer: &Framebuffer);

    fn capture_pointer(&mut self);

    fn release_pointer(&mut self);
}
