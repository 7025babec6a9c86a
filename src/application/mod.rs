pub mod todo_sync_service;

mod todo_sync_service_tests;
