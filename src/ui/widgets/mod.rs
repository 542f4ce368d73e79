pub mod dialog;

pub use dialog::ConfirmDialog;
