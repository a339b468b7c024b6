pub mod booking_time;
pub mod confidence;
pub mod location;
pub mod loyalty;
pub mod vehicle;
