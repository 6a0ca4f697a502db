pub mod check;
pub mod edit;
pub mod usages;

pub use check::{check, CheckArgs};
pub use edit::{clone, delete, move_element, CloneArgs, DeleteArgs, MoveArgs};
pub use usages::{usages, UsagesArgs};
