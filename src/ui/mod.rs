pub mod task_viewer;
