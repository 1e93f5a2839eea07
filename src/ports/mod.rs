mod allocator;
mod spec;

pub use allocator::{PortAllocator, PortSlot};
pub use spec::{parse_port_spec, MAX_PORT, MIN_PORT};
