#![allow(dead_code)]

pub mod memory_store;

pub use memory_store::MemoryForumRepository;
