pub mod scrollable_list;
pub mod status_bar;
