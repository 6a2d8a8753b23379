pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPatch, TaskPriority, TaskQuery, TaskStatus};
pub use user::{NewUser, ProfileUpdate, UserProfile, UserRecord};
