// ICT Parser - ui/panels/mod.rs

pub mod column_picker;
pub mod folder_picker;
