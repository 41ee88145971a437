mod birds_eye_view;
mod count;
mod get;
mod list;

pub use birds_eye_view::BirdsEyeViewOperation;
pub use count::CountOperation;
pub use get::GetOperation;
pub use list::ListOperation;
