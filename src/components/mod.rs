pub mod country_picker;
pub mod file_drop;
pub mod prompt_dialog;
pub mod reorder_list;
pub mod ui;

pub use country_picker::CountryPicker;
pub use file_drop::FileDrop;
pub use prompt_dialog::{PromptDialog, PromptHandle};
pub use reorder_list::ReorderList;
