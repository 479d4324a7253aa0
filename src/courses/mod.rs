//! # Courses Module
//!
//! The course catalog: metadata, fundraising, enrollment, and the lesson
//! structures hanging off each course.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         COURSES MODULE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────────────┐     │
//! │  │   Catalog   │  │ Enrollment  │  │          Lessons             │     │
//! │  │             │  │             │  │                              │     │
//! │  │ - Seeded    │  │ - Enroll    │  │ - Modules + lessons          │     │
//! │  │ - Create    │  │   (unique)  │  │ - Completion + progress      │     │
//! │  │ - Edit      │  │ - Donate    │  │ - Flat aula list + reorder   │     │
//! │  │ - Delete    │  │   (v > 0)   │  │ - Ratings + comments         │     │
//! │  │ - Icon set  │  │ - Funding % │  │ - Certificate eligibility    │     │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────────┬───────────────┘     │
//! │         │                │                        │                     │
//! │         └────────────────┴────────────────────────┘                     │
//! │                          │                                              │
//! │                       `cursos`          `lessonRatings` `lessonComments`│
//! │                     (one list)                 (two maps)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything on a course is mutated by read-modify-write of the whole
//! catalog list; ratings and lesson comments live in their own map keys.

mod catalog;
mod enrollment;
mod lessons;

pub use catalog::{Course, CourseService, COURSE_ICONS};
pub use enrollment::funding_progress;
pub use lessons::{
    calculate_progress, Aula, Comment, Lesson, Module, MoveDirection, NewLesson,
};
