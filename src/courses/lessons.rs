//! # Lessons, Ratings & Comments
//!
//! Two lesson structures coexist on a course, matching the stored data:
//! `modules` (modules with completable lessons, driving the progress bar)
//! and `aulas` (the flat recorded-lesson list managed from the course admin
//! screen, with ordering and view counts). Ratings and per-lesson comments
//! live in their own map keys, keyed by the lesson id rendered as a string.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::catalog::Course;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::keys;

/// A module grouping completable lessons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// Numeric id, `max + 1` within the course
    pub id: i64,
    /// Module title
    pub title: String,
    /// Module description
    pub description: String,
    /// Lessons in display order
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A completable lesson inside a module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    /// Numeric id, `max + 1` within the module
    pub id: i64,
    /// Lesson title
    pub title: String,
    /// Lesson description
    #[serde(default)]
    pub description: String,
    /// Video URL
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    /// Display duration, e.g. "15:30"
    #[serde(default)]
    pub duration: String,
    /// Whether the current user completed the lesson
    #[serde(default)]
    pub completed: bool,
}

/// Input for adding a lesson to a module
#[derive(Debug, Clone, Default)]
pub struct NewLesson {
    /// Lesson title (required)
    pub title: String,
    /// Lesson description
    pub description: String,
    /// Video URL (required)
    pub video_url: String,
    /// Display duration
    pub duration: String,
}

/// One recorded lesson in the flat `aulas` list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aula {
    /// Epoch-millis id
    pub id: i64,
    /// Lesson title
    #[serde(rename = "titulo")]
    pub title: String,
    /// Video URL
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    /// Duration in minutes
    #[serde(rename = "duracao")]
    pub duration_minutes: i64,
    /// 1-based display position
    #[serde(rename = "ordem")]
    pub position: i64,
    /// View counter
    #[serde(rename = "visualizacoes")]
    pub view_count: i64,
}

/// A dated comment (used for lessons and for courses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Author display name (or email when no name is set)
    pub user: String,
    /// Comment text
    pub text: String,
    /// Localized date string at posting time
    pub date: String,
}

/// Direction for reordering an aula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start of the list
    Up,
    /// Towards the end of the list
    Down,
}

/// Completion percentage over every lesson in the given modules.
///
/// Defined as `0` when there are no lessons, never NaN.
pub fn calculate_progress(modules: &[Module]) -> f64 {
    let total: usize = modules.iter().map(|m| m.lessons.len()).sum();
    if total == 0 {
        return 0.0;
    }
    let completed: usize = modules
        .iter()
        .map(|m| m.lessons.iter().filter(|l| l.completed).count())
        .sum();
    completed as f64 / total as f64 * 100.0
}

impl Course {
    /// Total lessons across all modules
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Whether a completion certificate can be issued: at least one lesson
    /// exists and every lesson is completed
    pub fn certificate_eligible(&self) -> bool {
        self.total_lessons() > 0
            && self
                .modules
                .iter()
                .all(|m| m.lessons.iter().all(|l| l.completed))
    }
}

impl super::CourseService {
    // ── Modules & lessons ───────────────────────────────────────────────

    /// A course with its module list initialized.
    ///
    /// Courses created from the catalog form have no modules; the detail
    /// view initializes a first module and persists it so later reads see
    /// the same structure.
    pub fn course_detail(&self, course_id: i64) -> Result<Course> {
        let course = self.course(course_id)?;
        if !course.modules.is_empty() {
            return Ok(course);
        }

        self.mutate_course(course_id, |course| {
            if course.modules.is_empty() {
                course.modules.push(Module {
                    id: 1,
                    title: "Módulo 1".to_string(),
                    description: "Introdução ao curso".to_string(),
                    lessons: Vec::new(),
                });
            }
            Ok(course.clone())
        })
    }

    /// Add a lesson to a module (admin only). Title and video URL are
    /// required.
    pub fn add_lesson(
        &self,
        actor: &SessionUser,
        course_id: i64,
        module_id: i64,
        lesson: NewLesson,
    ) -> Result<Lesson> {
        self.require_admin(actor)?;

        if lesson.title.trim().is_empty() || lesson.video_url.trim().is_empty() {
            return Err(Error::Validation(
                "Preencha o título e a URL do vídeo.".to_string(),
            ));
        }

        self.mutate_course(course_id, |course| {
            let module = course
                .modules
                .iter_mut()
                .find(|m| m.id == module_id)
                .ok_or(Error::ModuleNotFound)?;

            let id = module.lessons.iter().map(|l| l.id).max().unwrap_or(0) + 1;
            let lesson = Lesson {
                id,
                title: lesson.title.trim().to_string(),
                description: lesson.description.trim().to_string(),
                video_url: lesson.video_url.trim().to_string(),
                duration: lesson.duration.trim().to_string(),
                completed: false,
            };
            module.lessons.push(lesson.clone());
            Ok(lesson)
        })
    }

    /// Toggle a lesson's completion and recompute the course progress.
    pub fn toggle_lesson_completed(
        &self,
        course_id: i64,
        module_id: i64,
        lesson_id: i64,
    ) -> Result<Course> {
        self.mutate_course(course_id, |course| {
            let module = course
                .modules
                .iter_mut()
                .find(|m| m.id == module_id)
                .ok_or(Error::ModuleNotFound)?;
            let lesson = module
                .lessons
                .iter_mut()
                .find(|l| l.id == lesson_id)
                .ok_or(Error::LessonNotFound)?;
            lesson.completed = !lesson.completed;

            course.progress = calculate_progress(&course.modules);
            Ok(course.clone())
        })
    }

    // ── Aulas (flat recorded list) ──────────────────────────────────────

    /// Append a recorded aula (admin only). The id is the millisecond
    /// timestamp; the position is the current list length plus one.
    pub fn add_aula(
        &self,
        actor: &SessionUser,
        course_id: i64,
        title: &str,
        video_url: &str,
        duration_minutes: i64,
    ) -> Result<Aula> {
        self.require_admin(actor)?;

        if title.trim().is_empty() || video_url.trim().is_empty() {
            return Err(Error::Validation(
                "Preencha o título e a URL do vídeo.".to_string(),
            ));
        }

        self.mutate_course(course_id, |course| {
            let aula = Aula {
                id: crate::time::now_timestamp_millis(),
                title: title.trim().to_string(),
                video_url: video_url.trim().to_string(),
                duration_minutes,
                position: course.aulas.len() as i64 + 1,
                view_count: 0,
            };
            course.aulas.push(aula.clone());
            Ok(aula)
        })
    }

    /// Move an aula one position up or down, renumbering positions.
    ///
    /// Moving the first aula up (or the last down) is a no-op, matching the
    /// reorder buttons.
    pub fn move_aula(
        &self,
        actor: &SessionUser,
        course_id: i64,
        aula_id: i64,
        direction: MoveDirection,
    ) -> Result<Vec<Aula>> {
        self.require_admin(actor)?;

        self.mutate_course(course_id, |course| {
            let index = course
                .aulas
                .iter()
                .position(|a| a.id == aula_id)
                .ok_or(Error::LessonNotFound)?;

            match direction {
                MoveDirection::Up if index > 0 => course.aulas.swap(index - 1, index),
                MoveDirection::Down if index + 1 < course.aulas.len() => {
                    course.aulas.swap(index, index + 1)
                }
                _ => {}
            }

            for (i, aula) in course.aulas.iter_mut().enumerate() {
                aula.position = i as i64 + 1;
            }
            Ok(course.aulas.clone())
        })
    }

    /// Count one view of an aula.
    pub fn record_aula_view(&self, course_id: i64, aula_id: i64) -> Result<()> {
        self.mutate_course(course_id, |course| {
            let aula = course
                .aulas
                .iter_mut()
                .find(|a| a.id == aula_id)
                .ok_or(Error::LessonNotFound)?;
            aula.view_count += 1;
            Ok(())
        })
    }

    // ── Ratings ─────────────────────────────────────────────────────────

    /// Rate a lesson from 1 to 5. Re-rating replaces the previous value.
    pub fn rate_lesson(&self, lesson_id: i64, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Validation(
                "A avaliação deve ser de 1 a 5.".to_string(),
            ));
        }
        self.store().update(
            keys::LESSON_RATINGS,
            HashMap::<String, u8>::new,
            |ratings| {
                ratings.insert(lesson_id.to_string(), rating);
            },
        )
    }

    /// The stored rating for a lesson, if any.
    pub fn lesson_rating(&self, lesson_id: i64) -> Result<Option<u8>> {
        let ratings: HashMap<String, u8> = self
            .store()
            .load_or_seed(keys::LESSON_RATINGS, HashMap::new)?;
        Ok(ratings.get(&lesson_id.to_string()).copied())
    }

    // ── Comments ────────────────────────────────────────────────────────

    /// Append a comment to a lesson.
    pub fn add_lesson_comment(
        &self,
        actor: &SessionUser,
        lesson_id: i64,
        text: &str,
    ) -> Result<Comment> {
        let comment = build_comment(actor, text)?;
        let stored = comment.clone();
        self.store().update(
            keys::LESSON_COMMENTS,
            HashMap::<String, Vec<Comment>>::new,
            move |comments| {
                comments
                    .entry(lesson_id.to_string())
                    .or_default()
                    .push(stored);
            },
        )?;
        Ok(comment)
    }

    /// Comments on a lesson, oldest first.
    pub fn lesson_comments(&self, lesson_id: i64) -> Result<Vec<Comment>> {
        let comments: HashMap<String, Vec<Comment>> = self
            .store()
            .load_or_seed(keys::LESSON_COMMENTS, HashMap::new)?;
        Ok(comments
            .get(&lesson_id.to_string())
            .cloned()
            .unwrap_or_default())
    }

    /// Append a comment to the course itself.
    pub fn add_course_comment(
        &self,
        actor: &SessionUser,
        course_id: i64,
        text: &str,
    ) -> Result<Comment> {
        let comment = build_comment(actor, text)?;
        let stored = comment.clone();
        self.mutate_course(course_id, move |course| {
            course.comments.push(stored);
            Ok(())
        })?;
        Ok(comment)
    }

    /// Read-modify-write one course inside the catalog list.
    fn mutate_course<R>(
        &self,
        course_id: i64,
        f: impl FnOnce(&mut Course) -> Result<R>,
    ) -> Result<R> {
        let mut courses: Vec<Course> = self
            .store()
            .load_or_seed(keys::COURSES, || super::catalog::DEFAULT_COURSES.clone())?;

        let course = courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or(Error::CourseNotFound)?;
        let result = f(course)?;

        self.store().save(keys::COURSES, &courses)?;
        Ok(result)
    }
}

fn build_comment(actor: &SessionUser, text: &str) -> Result<Comment> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Validation("O comentário não pode ser vazio.".into()));
    }
    let user = if actor.name.trim().is_empty() {
        actor.email.clone()
    } else {
        actor.name.clone()
    };
    Ok(Comment {
        user,
        text: text.to_string(),
        date: crate::time::now_display_datetime(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::catalog::test_support::{admin, member, test_service};
    use super::*;

    fn lesson(title: &str) -> NewLesson {
        NewLesson {
            title: title.to_string(),
            description: String::new(),
            video_url: "https://www.youtube.com/watch?v=abc".to_string(),
            duration: "15:30".to_string(),
        }
    }

    #[test]
    fn test_course_detail_initializes_first_module() {
        let service = test_service();

        let course = service.course_detail(1).unwrap();
        assert_eq!(course.modules.len(), 1);
        assert_eq!(course.modules[0].title, "Módulo 1");

        // Initialization is persisted, not recomputed per read.
        let again = service.course(1).unwrap();
        assert_eq!(again.modules.len(), 1);
    }

    #[test]
    fn test_add_lesson() {
        let service = test_service();
        service.course_detail(1).unwrap();

        let first = service.add_lesson(&admin(), 1, 1, lesson("Introdução")).unwrap();
        let second = service.add_lesson(&admin(), 1, 1, lesson("Conceitos")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.completed);

        assert!(matches!(
            service.add_lesson(&member(), 1, 1, lesson("X")),
            Err(Error::AdminRequired)
        ));
        assert!(matches!(
            service.add_lesson(&admin(), 1, 1, NewLesson::default()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.add_lesson(&admin(), 1, 99, lesson("X")),
            Err(Error::ModuleNotFound)
        ));
    }

    #[test]
    fn test_progress_zero_lessons_is_zero() {
        let service = test_service();
        let course = service.course_detail(1).unwrap();

        // No lessons yet: 0, not NaN.
        assert_eq!(calculate_progress(&course.modules), 0.0);
        assert_eq!(course.progress, 0.0);
    }

    #[test]
    fn test_toggle_updates_progress() {
        let service = test_service();
        service.course_detail(1).unwrap();
        service.add_lesson(&admin(), 1, 1, lesson("A")).unwrap();
        service.add_lesson(&admin(), 1, 1, lesson("B")).unwrap();

        let course = service.toggle_lesson_completed(1, 1, 1).unwrap();
        assert_eq!(course.progress, 50.0);

        let course = service.toggle_lesson_completed(1, 1, 2).unwrap();
        assert_eq!(course.progress, 100.0);
        assert!(course.certificate_eligible());

        // Untoggling brings progress back down.
        let course = service.toggle_lesson_completed(1, 1, 2).unwrap();
        assert_eq!(course.progress, 50.0);
        assert!(!course.certificate_eligible());
    }

    #[test]
    fn test_certificate_requires_lessons() {
        let service = test_service();
        let course = service.course_detail(1).unwrap();
        assert!(!course.certificate_eligible());
    }

    #[test]
    fn test_aulas_append_and_reorder() {
        let service = test_service();
        let actor = admin();

        let a = service.add_aula(&actor, 1, "Aula 1", "https://youtu.be/a", 20).unwrap();
        let b = service.add_aula(&actor, 1, "Aula 2", "https://youtu.be/b", 30).unwrap();
        assert_eq!(a.position, 1);
        assert_eq!(b.position, 2);
        assert_eq!(a.view_count, 0);

        let aulas = service.move_aula(&actor, 1, b.id, MoveDirection::Up).unwrap();
        assert_eq!(aulas[0].title, "Aula 2");
        assert_eq!(aulas[0].position, 1);
        assert_eq!(aulas[1].position, 2);

        // Moving the first aula up is a no-op.
        let aulas = service.move_aula(&actor, 1, b.id, MoveDirection::Up).unwrap();
        assert_eq!(aulas[0].title, "Aula 2");

        assert!(matches!(
            service.move_aula(&actor, 1, 42, MoveDirection::Down),
            Err(Error::LessonNotFound)
        ));
    }

    #[test]
    fn test_record_aula_view() {
        let service = test_service();
        let aula = service
            .add_aula(&admin(), 1, "Aula", "https://youtu.be/a", 20)
            .unwrap();

        service.record_aula_view(1, aula.id).unwrap();
        service.record_aula_view(1, aula.id).unwrap();

        let course = service.course(1).unwrap();
        assert_eq!(course.aulas[0].view_count, 2);
    }

    #[test]
    fn test_rate_lesson() {
        let service = test_service();

        service.rate_lesson(1, 4).unwrap();
        assert_eq!(service.lesson_rating(1).unwrap(), Some(4));

        // Re-rating replaces.
        service.rate_lesson(1, 2).unwrap();
        assert_eq!(service.lesson_rating(1).unwrap(), Some(2));

        assert!(matches!(service.rate_lesson(1, 0), Err(Error::Validation(_))));
        assert!(matches!(service.rate_lesson(1, 6), Err(Error::Validation(_))));
        assert_eq!(service.lesson_rating(9).unwrap(), None);
    }

    #[test]
    fn test_lesson_comments() {
        let service = test_service();
        let actor = member();

        service.add_lesson_comment(&actor, 1, "Ótima aula!").unwrap();
        service.add_lesson_comment(&actor, 1, "Revi e entendi melhor.").unwrap();

        let comments = service.lesson_comments(1).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].user, "Membro");
        assert!(service.lesson_comments(2).unwrap().is_empty());

        assert!(matches!(
            service.add_lesson_comment(&actor, 1, "  "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_course_comments() {
        let service = test_service();
        service.add_course_comment(&member(), 1, "Curso excelente").unwrap();

        let course = service.course(1).unwrap();
        assert_eq!(course.comments.len(), 1);
        assert_eq!(course.comments[0].text, "Curso excelente");
    }
}
