pub mod user;
pub mod video;

pub use user::UserRecord;
pub use video::{sort_newest_first, Hotcues, VideoRecord};
