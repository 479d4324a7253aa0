//! # Enrollment & Donations
//!
//! Enrollment keeps `inscritos` unique by checking membership before
//! insert. Donations are validated before any mutation; a confirmed
//! donation adds exactly the given amount to `valorArrecadado`.

use super::catalog::Course;
use crate::error::{Error, Result};
use crate::storage::keys;

impl super::CourseService {
    // ── Enrollment ──────────────────────────────────────────────────────

    /// Enroll an email in a course.
    ///
    /// A second enrollment of the same email is rejected and never
    /// duplicates the entry.
    pub fn enroll(&self, course_id: i64, email: &str) -> Result<Course> {
        if email.trim().is_empty() {
            return Err(Error::Validation("Sessão sem email válido.".into()));
        }

        self.with_course(course_id, |course| {
            if course.enrolled.iter().any(|e| e == email) {
                return Err(Error::AlreadyEnrolled);
            }
            course.enrolled.push(email.to_string());
            Ok(course.clone())
        })
    }

    /// Remove an email from a course's enrollment list.
    pub fn unenroll(&self, course_id: i64, email: &str) -> Result<Course> {
        self.with_course(course_id, |course| {
            let before = course.enrolled.len();
            course.enrolled.retain(|e| e != email);
            if course.enrolled.len() == before {
                return Err(Error::NotEnrolled);
            }
            Ok(course.clone())
        })
    }

    /// Whether an email is enrolled in a course.
    pub fn is_enrolled(&self, course_id: i64, email: &str) -> Result<bool> {
        Ok(self.course(course_id)?.enrolled.iter().any(|e| e == email))
    }

    /// Every course an email is enrolled in ("Meus Cursos").
    pub fn enrolled_courses(&self, email: &str) -> Result<Vec<Course>> {
        Ok(self
            .courses()?
            .into_iter()
            .filter(|c| c.enrolled.iter().any(|e| e == email))
            .collect())
    }

    // ── Donations ───────────────────────────────────────────────────────

    /// Record a confirmed donation to a course.
    ///
    /// The amount must be a finite number greater than zero; anything else
    /// is rejected before the catalog is touched.
    pub fn donate(&self, course_id: i64, amount: f64) -> Result<Course> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidDonation(format!("{}", amount)));
        }

        self.with_course(course_id, |course| {
            course.amount_raised += amount;
            tracing::info!(
                "Donation of {:.2} to course {} (total {:.2})",
                amount,
                course.id,
                course.amount_raised
            );
            Ok(course.clone())
        })
    }

    /// Read-modify-write one course inside the catalog list.
    fn with_course(
        &self,
        course_id: i64,
        f: impl FnOnce(&mut Course) -> Result<Course>,
    ) -> Result<Course> {
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

/// Fundraising progress as a percentage of the goal.
///
/// Defined as `0` when the goal is zero (or negative), never NaN.
pub fn funding_progress(course: &Course) -> f64 {
    if course.funding_goal <= 0.0 {
        return 0.0;
    }
    course.amount_raised / course.funding_goal * 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::catalog::test_support::{admin, empty_catalog_service, test_service};
    use super::*;

    #[test]
    fn test_enroll_is_unique() {
        let service = test_service();

        let course = service.enroll(2, "ana@exemplo.com").unwrap();
        assert_eq!(course.enrolled, vec!["ana@exemplo.com"]);

        // Enrolling twice must not duplicate the email.
        assert!(matches!(
            service.enroll(2, "ana@exemplo.com"),
            Err(Error::AlreadyEnrolled)
        ));
        assert_eq!(service.course(2).unwrap().enrolled.len(), 1);
    }

    #[test]
    fn test_unenroll() {
        let service = test_service();
        service.enroll(2, "ana@exemplo.com").unwrap();

        let course = service.unenroll(2, "ana@exemplo.com").unwrap();
        assert!(course.enrolled.is_empty());

        assert!(matches!(
            service.unenroll(2, "ana@exemplo.com"),
            Err(Error::NotEnrolled)
        ));
    }

    #[test]
    fn test_enrolled_courses() {
        let service = test_service();
        service.enroll(2, "ana@exemplo.com").unwrap();
        service.enroll(3, "ana@exemplo.com").unwrap();

        let mine = service.enrolled_courses("ana@exemplo.com").unwrap();
        let ids: Vec<i64> = mine.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_donate_adds_exactly() {
        let service = test_service();
        let before = service.course(1).unwrap().amount_raised;

        let course = service.donate(1, 75.5).unwrap();
        assert_eq!(course.amount_raised, before + 75.5);
    }

    #[test]
    fn test_donate_rejects_non_positive() {
        let service = test_service();
        let before = service.course(1).unwrap().amount_raised;

        assert!(matches!(service.donate(1, 0.0), Err(Error::InvalidDonation(_))));
        assert!(matches!(service.donate(1, -10.0), Err(Error::InvalidDonation(_))));
        assert!(matches!(
            service.donate(1, f64::NAN),
            Err(Error::InvalidDonation(_))
        ));

        // Rejected before mutation.
        assert_eq!(service.course(1).unwrap().amount_raised, before);
    }

    #[test]
    fn test_donate_unknown_course() {
        let service = test_service();
        assert!(matches!(service.donate(99, 10.0), Err(Error::CourseNotFound)));
    }

    #[test]
    fn test_funding_progress() {
        let service = empty_catalog_service();
        let course = service
            .create_course(&admin(), "X", "Y", "bookOpen", 0.0)
            .unwrap();
        // Zero goal never divides by zero.
        assert_eq!(funding_progress(&course), 0.0);

        let course = service
            .create_course(&admin(), "Z", "W", "bookOpen", 1000.0)
            .unwrap();
        let course = service.donate(course.id, 250.0).unwrap();
        assert_eq!(funding_progress(&course), 25.0);
    }
}
