pub mod advisory;
pub mod financing;
pub mod wizard;
