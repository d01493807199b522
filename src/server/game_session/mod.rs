pub mod registry;
pub mod room;
pub mod session;
pub mod messages;

#[cfg(test)]
pub mod test_support;

pub use registry::RoomRegistry;
