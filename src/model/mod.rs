pub mod feed;
pub mod task;
pub mod timeline;

pub use feed::TaskFeed;
pub use task::{Priority, Task, TaskId, TaskStatus, User, UserId};
pub use timeline::{ViewportState, ZoomLevel};
