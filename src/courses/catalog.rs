//! # Course Catalog
//!
//! Catalog CRUD. New course ids are `max(existing ids) + 1`; this is
//! collision-prone under concurrent writers and deliberately not guarded,
//! matching the store's single-writer model.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::lessons::{Aula, Comment, Module};
use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::{keys, EntityStore};

/// Valid course icons.
pub const COURSE_ICONS: &[&str] = &[
    "bookOpen",
    "banknote",
    "users",
    "recycle",
    "leaf",
    "globe",
    "lightbulb",
    "rocket",
];

/// The central content entity: metadata, fundraising, enrollment, and
/// optional lesson sub-structures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Numeric id, `max + 1` at creation
    pub id: i64,

    /// Course title
    #[serde(rename = "titulo")]
    pub title: String,

    /// Course description
    #[serde(rename = "descricao")]
    pub description: String,

    /// Icon name from [`COURSE_ICONS`]
    #[serde(rename = "icone")]
    pub icon: String,

    /// Fundraising goal
    #[serde(rename = "metaArrecadacao")]
    pub funding_goal: f64,

    /// Amount raised so far
    #[serde(rename = "valorArrecadado")]
    pub amount_raised: f64,

    /// Enrolled emails, unique
    #[serde(rename = "inscritos")]
    pub enrolled: Vec<String>,

    /// Lesson modules (initialized on first course detail read)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Module>,

    /// Flat recorded-lesson list managed from the course admin screen
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aulas: Vec<Aula>,

    /// Course-level comments
    #[serde(rename = "comentarios", default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,

    /// Completion percentage, recomputed when lessons are toggled
    #[serde(default)]
    pub progress: f64,

    /// Optional intro video URL
    #[serde(rename = "videoUrl", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Optional thumbnail URL
    #[serde(
        rename = "thumbnailUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,
}

impl Course {
    /// A course with empty enrollment and nothing raised
    fn new(id: i64, title: String, description: String, icon: String, funding_goal: f64) -> Self {
        Self {
            id,
            title,
            description,
            icon,
            funding_goal,
            amount_raised: 0.0,
            enrolled: Vec::new(),
            modules: Vec::new(),
            aulas: Vec::new(),
            comments: Vec::new(),
            progress: 0.0,
            video_url: None,
            thumbnail_url: None,
        }
    }
}

/// Default catalog, written once when the `cursos` key is absent.
pub(super) static DEFAULT_COURSES: Lazy<Vec<Course>> = Lazy::new(|| {
    vec![
        Course {
            amount_raised: 2500.0,
            enrolled: vec!["usuario@exemplo.com".to_string()],
            ..Course::new(
                1,
                "Finanças Sustentáveis".to_string(),
                "Aprenda como integrar práticas sustentáveis em decisões financeiras e \
                 investimentos responsáveis."
                    .to_string(),
                "banknote".to_string(),
                5000.0,
            )
        },
        Course {
            amount_raised: 1200.0,
            ..Course::new(
                2,
                "Liderança Ambiental".to_string(),
                "Desenvolva habilidades de liderança focadas em sustentabilidade e gestão \
                 ambiental."
                    .to_string(),
                "users".to_string(),
                3000.0,
            )
        },
        Course {
            amount_raised: 3200.0,
            ..Course::new(
                3,
                "Economia Circular".to_string(),
                "Entenda os princípios da economia circular e como implementá-los em \
                 diferentes setores."
                    .to_string(),
                "recycle".to_string(),
                4000.0,
            )
        },
    ]
});

/// Course catalog, enrollment, and lesson service
pub struct CourseService {
    store: Arc<EntityStore>,
    #[allow(dead_code)]
    config: CoreConfig,
}

impl CourseService {
    /// Create a course service over the shared store
    pub fn new(store: Arc<EntityStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    pub(super) fn store(&self) -> &EntityStore {
        &self.store
    }

    pub(super) fn require_admin(&self, actor: &SessionUser) -> Result<()> {
        if actor.is_admin {
            Ok(())
        } else {
            Err(Error::AdminRequired)
        }
    }

    /// The whole catalog, seeding the defaults on first read.
    pub fn courses(&self) -> Result<Vec<Course>> {
        self.store()
            .load_or_seed(keys::COURSES, || DEFAULT_COURSES.clone())
    }

    /// One course by id.
    pub fn course(&self, id: i64) -> Result<Course> {
        self.courses()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(Error::CourseNotFound)
    }

    /// Create a course (admin only).
    ///
    /// Title and description are required; the icon must come from the
    /// fixed icon set; the funding goal cannot be negative. The new course
    /// starts with nothing raised and no enrollment.
    pub fn create_course(
        &self,
        actor: &SessionUser,
        title: &str,
        description: &str,
        icon: &str,
        funding_goal: f64,
    ) -> Result<Course> {
        self.require_admin(actor)?;
        validate_course_fields(title, description, icon, funding_goal)?;

        self.store().update(
            keys::COURSES,
            || DEFAULT_COURSES.clone(),
            |courses| {
                let id = courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
                let course = Course::new(
                    id,
                    title.trim().to_string(),
                    description.trim().to_string(),
                    icon.to_string(),
                    funding_goal,
                );
                courses.push(course.clone());
                tracing::info!("Created course {} ({})", id, course.title);
                course
            },
        )
    }

    /// Edit a course's metadata (admin only). `None` fields are left as-is.
    pub fn update_course(
        &self,
        actor: &SessionUser,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
        funding_goal: Option<f64>,
    ) -> Result<Course> {
        self.require_admin(actor)?;

        if let Some(icon) = icon {
            if !COURSE_ICONS.contains(&icon) {
                return Err(Error::InvalidIcon(icon.to_string()));
            }
        }

        self.store().update(
            keys::COURSES,
            || DEFAULT_COURSES.clone(),
            |courses| {
                let course = courses
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(Error::CourseNotFound)?;
                if let Some(title) = title {
                    if title.trim().is_empty() {
                        return Err(Error::Validation("Informe o título do curso.".into()));
                    }
                    course.title = title.trim().to_string();
                }
                if let Some(description) = description {
                    course.description = description.trim().to_string();
                }
                if let Some(icon) = icon {
                    course.icon = icon.to_string();
                }
                if let Some(goal) = funding_goal {
                    course.funding_goal = goal;
                }
                Ok(course.clone())
            },
        )?
    }

    /// Delete a course (admin only).
    pub fn delete_course(&self, actor: &SessionUser, id: i64) -> Result<()> {
        self.require_admin(actor)?;

        self.store().update(
            keys::COURSES,
            || DEFAULT_COURSES.clone(),
            |courses| {
                let before = courses.len();
                courses.retain(|c| c.id != id);
                if courses.len() == before {
                    return Err(Error::CourseNotFound);
                }
                tracing::info!("Deleted course {}", id);
                Ok(())
            },
        )?
    }
}

fn validate_course_fields(
    title: &str,
    description: &str,
    icon: &str,
    funding_goal: f64,
) -> Result<()> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(Error::Validation(
            "Preencha todos os campos obrigatórios.".to_string(),
        ));
    }
    if !COURSE_ICONS.contains(&icon) {
        return Err(Error::InvalidIcon(icon.to_string()));
    }
    if !funding_goal.is_finite() || funding_goal < 0.0 {
        return Err(Error::Validation(
            "A meta de arrecadação não pode ser negativa.".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
