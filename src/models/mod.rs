pub mod assignment;
pub mod driver;
pub mod invite;
pub mod job;
