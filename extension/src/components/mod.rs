mod error_view;

pub use error_view::show_startup_error;
