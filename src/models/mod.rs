pub mod day;
pub mod discipline;
pub mod task;
pub mod user;

pub use day::{Day, DayTally, DayView, SetCompletionRequest, TaskState};
pub use discipline::{
    Discipline, DisciplineDetail, DisciplineStatus, DisciplineView, NewDisciplineRequest,
    UpdateDisciplineRequest,
};
pub use task::{NewTaskRequest, Priority, Task, UpdateTaskRequest};
pub use user::{NewUserRequest, UpdateUserRequest, User};
