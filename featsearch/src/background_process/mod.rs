pub mod run_in_background;
pub mod task_context;
pub mod signal;
pub mod background_process_registry;
pub mod background_process_handler;
pub mod background_process_builder;
