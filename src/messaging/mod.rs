// Messaging domain - message construction, pub/sub backends and the object publisher

pub mod domain;
pub mod envelope;
pub mod google_cloud;
pub mod publisher;
pub mod redis;
