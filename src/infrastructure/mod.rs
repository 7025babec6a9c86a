pub mod broadcaster;
pub mod memory_repo;

mod memory_repo_tests;
