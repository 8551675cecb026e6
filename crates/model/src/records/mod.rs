pub mod message;
pub mod record;
