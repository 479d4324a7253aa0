//! # Events Module
//!
//! Community events, plus the one versioned entity migration in the
//! system: older stored events carried a single `horario` range string
//! ("14:00 - 17:00"); the current shape stores `horarioInicio` and
//! `horarioFim` separately.
//!
//! The migration runs once at platform open, gated by the
//! `eventos_schema_version` marker, and returns a per-record report:
//! records that cannot be migrated are reported and left untouched rather
//! than silently dropped.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::{keys, EntityStore};

/// Current version of the stored event shape
pub const EVENTS_SCHEMA_CURRENT: i32 = 2;

/// A community event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Numeric id, `max + 1` at creation
    pub id: i64,
    /// Event title
    #[serde(rename = "titulo")]
    pub title: String,
    /// Display date, e.g. "15 de Junho, 2026"
    #[serde(rename = "data")]
    pub date: String,
    /// Start time, e.g. "14:00"
    #[serde(rename = "horarioInicio")]
    pub start_time: String,
    /// End time, e.g. "17:00"
    #[serde(rename = "horarioFim")]
    pub end_time: String,
    /// Venue
    #[serde(rename = "local")]
    pub location: String,
    /// Attendance counter shown on the card
    #[serde(rename = "participantes")]
    pub participant_count: i64,
    /// Event description
    #[serde(rename = "descricao")]
    pub description: String,
    /// Category tag, e.g. "workshop"
    #[serde(rename = "categoria")]
    pub category: String,
    /// Registered emails, unique
    #[serde(rename = "inscritos", default, skip_serializing_if = "Vec::is_empty")]
    pub registered: Vec<String>,
}

/// Default events, written once when the `eventos` key is absent.
/// Seeds are always written in the current shape.
static DEFAULT_EVENTS: Lazy<Vec<Event>> = Lazy::new(|| {
    vec![
        Event {
            id: 1,
            title: "Workshop de Sustentabilidade".to_string(),
            date: "15 de Junho, 2026".to_string(),
            start_time: "14:00".to_string(),
            end_time: "17:00".to_string(),
            location: "Centro de Convenções Verdant".to_string(),
            participant_count: 45,
            description: "Aprenda práticas sustentáveis para implementar em sua comunidade e \
                          empresa."
                .to_string(),
            category: "workshop".to_string(),
            registered: Vec::new(),
        },
        Event {
            id: 2,
            title: "Conferência Anual de Meio Ambiente".to_string(),
            date: "22 de Julho, 2026".to_string(),
            start_time: "09:00".to_string(),
            end_time: "18:00".to_string(),
            location: "Auditório Principal".to_string(),
            participant_count: 120,
            description: "Discussões sobre políticas ambientais e apresentação de projetos \
                          inovadores."
                .to_string(),
            category: "conferencia".to_string(),
            registered: Vec::new(),
        },
        Event {
            id: 3,
            title: "Curso de Educação Ambiental para Educadores".to_string(),
            date: "5-7 de Agosto, 2026".to_string(),
            start_time: "09:00".to_string(),
            end_time: "16:00".to_string(),
            location: "Sala de Treinamento Verdant".to_string(),
            participant_count: 30,
            description: "Capacitação para professores sobre como integrar educação ambiental \
                          no currículo escolar."
                .to_string(),
            category: "curso".to_string(),
            registered: Vec::new(),
        },
    ]
});

/// One record that could not be migrated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFailure {
    /// The record's id, when one could be read
    pub id: Option<i64>,
    /// Why the record was left untouched
    pub reason: String,
}

/// Outcome of the event shape migration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records rewritten into the current shape
    pub migrated: usize,
    /// Records already in the current shape
    pub already_current: usize,
    /// Records left untouched because migration failed
    pub failures: Vec<MigrationFailure>,
}

/// Event listing, creation, and registration service
pub struct EventService {
    store: Arc<EntityStore>,
    #[allow(dead_code)]
    config: CoreConfig,
}

impl EventService {
    /// Create an event service over the shared store
    pub fn new(store: Arc<EntityStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    fn store(&self) -> &EntityStore {
        &self.store
    }

    /// All events, seeding the defaults on first read.
    pub fn events(&self) -> Result<Vec<Event>> {
        self.store()
            .load_or_seed(keys::EVENTS, || DEFAULT_EVENTS.clone())
    }

    /// One event by id.
    pub fn event(&self, id: i64) -> Result<Event> {
        self.events()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(Error::EventNotFound)
    }

    /// Create an event (admin only).
    #[allow(clippy::too_many_arguments)]
    pub fn create_event(
        &self,
        actor: &SessionUser,
        title: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
        location: &str,
        description: &str,
        category: &str,
    ) -> Result<Event> {
        if !actor.is_admin {
            return Err(Error::AdminRequired);
        }
        if title.trim().is_empty() || date.trim().is_empty() {
            return Err(Error::Validation(
                "Preencha o título e a data do evento.".to_string(),
            ));
        }

        self.store().update(
            keys::EVENTS,
            || DEFAULT_EVENTS.clone(),
            |events| {
                let id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
                let event = Event {
                    id,
                    title: title.trim().to_string(),
                    date: date.trim().to_string(),
                    start_time: start_time.trim().to_string(),
                    end_time: end_time.trim().to_string(),
                    location: location.trim().to_string(),
                    participant_count: 0,
                    description: description.trim().to_string(),
                    category: category.trim().to_string(),
                    registered: Vec::new(),
                };
                events.push(event.clone());
                event
            },
        )
    }

    /// Register an email for an event. Registration is unique; the visible
    /// participant counter follows the list.
    pub fn register(&self, event_id: i64, email: &str) -> Result<Event> {
        if email.trim().is_empty() {
            return Err(Error::Validation("Sessão sem email válido.".into()));
        }

        let mut events: Vec<Event> = self
            .store()
            .load_or_seed(keys::EVENTS, || DEFAULT_EVENTS.clone())?;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(Error::EventNotFound)?;

        if event.registered.iter().any(|e| e == email) {
            return Err(Error::AlreadyRegistered);
        }
        event.registered.push(email.to_string());
        event.participant_count += 1;
        let updated = event.clone();

        self.store().save(keys::EVENTS, &events)?;
        Ok(updated)
    }

    // ========================================================================
    // SHAPE MIGRATION
    // ========================================================================

    /// Migrate stored events from the v1 shape (`horario` range string) to
    /// the current shape, once.
    ///
    /// Gated by the `eventos_schema_version` marker: after a successful
    /// pass the marker is set and later calls return an empty report.
    /// Records that fail to migrate are reported and left as stored.
    pub fn migrate_events(&self) -> Result<MigrationReport> {
        let version: Option<i32> = self.store().load(keys::EVENTS_SCHEMA_VERSION)?;
        if version == Some(EVENTS_SCHEMA_CURRENT) {
            return Ok(MigrationReport::default());
        }

        // Nothing stored yet: the seed is already in the current shape.
        let Some(mut records) = self.store().load::<Vec<serde_json::Value>>(keys::EVENTS)? else {
            self.store()
                .save(keys::EVENTS_SCHEMA_VERSION, &EVENTS_SCHEMA_CURRENT)?;
            return Ok(MigrationReport::default());
        };

        let mut report = MigrationReport::default();
        for record in records.iter_mut() {
            match migrate_record(record) {
                Ok(true) => report.migrated += 1,
                Ok(false) => report.already_current += 1,
                Err(reason) => {
                    let id = record.get("id").and_then(serde_json::Value::as_i64);
                    tracing::warn!(
                        "Event record {:?} not migrated: {}",
                        id,
                        reason
                    );
                    report.failures.push(MigrationFailure { id, reason });
                }
            }
        }

        self.store().save(keys::EVENTS, &records)?;
        self.store()
            .save(keys::EVENTS_SCHEMA_VERSION, &EVENTS_SCHEMA_CURRENT)?;

        if report.migrated > 0 || !report.failures.is_empty() {
            tracing::info!(
                "Event migration: {} migrated, {} current, {} failed",
                report.migrated,
                report.already_current,
                report.failures.len()
            );
        }
        Ok(report)
    }
}

/// Rewrite one raw event record in place.
///
/// Returns `Ok(true)` when the record was migrated, `Ok(false)` when it was
/// already in the current shape, and `Err` with a reason otherwise.
fn migrate_record(record: &mut serde_json::Value) -> std::result::Result<bool, String> {
    let obj = record
        .as_object_mut()
        .ok_or_else(|| "record is not an object".to_string())?;

    if obj.contains_key("horarioInicio") {
        obj.remove("horario");
        return Ok(false);
    }

    let horario = obj
        .get("horario")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| "missing 'horario' field".to_string())?;

    let (start, end) = horario
        .split_once('-')
        .ok_or_else(|| format!("cannot split time range '{}'", horario))?;
    let (start, end) = (start.trim().to_string(), end.trim().to_string());
    if start.is_empty() || end.is_empty() {
        return Err(format!("cannot split time range '{}'", horario));
    }

    obj.insert("horarioInicio".to_string(), start.into());
    obj.insert("horarioFim".to_string(), end.into());
    obj.remove("horario");
    Ok(true)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn service() -> EventService {
        let store = Arc::new(EntityStore::new(Database::open(None).unwrap()));
        EventService::new(store, CoreConfig::default())
    }

    fn admin() -> SessionUser {
        SessionUser::new("Admin".into(), "admin@exemplo.com".into(), true)
    }

    #[test]
    fn test_seeded_events() {
        let service = service();
        let events = service.events().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].start_time, "14:00");
        assert_eq!(events[0].end_time, "17:00");
    }

    #[test]
    fn test_create_event() {
        let service = service();
        let event = service
            .create_event(
                &admin(),
                "Plantio Comunitário",
                "10 de Setembro, 2026",
                "08:00",
                "12:00",
                "Parque Central",
                "Plantio de mudas nativas.",
                "workshop",
            )
            .unwrap();
        assert_eq!(event.id, 4);
        assert_eq!(event.participant_count, 0);
    }

    #[test]
    fn test_register_is_unique_and_counts() {
        let service = service();
        service.events().unwrap();

        let event = service.register(1, "ana@exemplo.com").unwrap();
        assert_eq!(event.participant_count, 46);
        assert_eq!(event.registered, vec!["ana@exemplo.com"]);

        assert!(matches!(
            service.register(1, "ana@exemplo.com"),
            Err(Error::AlreadyRegistered)
        ));
        assert_eq!(service.event(1).unwrap().participant_count, 46);
    }

    #[test]
    fn test_migration_splits_time_range() {
        let service = service();

        // Pre-existing v1 data, written before the shape change.
        service
            .store()
            .save_raw(
                keys::EVENTS,
                r#"[{"id":1,"titulo":"Antigo","data":"1 de Maio, 2025","horario":"14:00 - 17:00","local":"Sede","participantes":10,"descricao":"d","categoria":"workshop"}]"#,
            )
            .unwrap();

        let report = service.migrate_events().unwrap();
        assert_eq!(report.migrated, 1);
        assert!(report.failures.is_empty());

        let events = service.events().unwrap();
        assert_eq!(events[0].start_time, "14:00");
        assert_eq!(events[0].end_time, "17:00");
    }

    #[test]
    fn test_migration_reports_bad_records() {
        let service = service();

        service
            .store()
            .save_raw(
                keys::EVENTS,
                r#"[
                    {"id":1,"titulo":"Ok","data":"d","horario":"09:00 - 16:00","local":"l","participantes":1,"descricao":"x","categoria":"curso"},
                    {"id":2,"titulo":"Quebrado","data":"d","horario":"o dia todo","local":"l","participantes":1,"descricao":"x","categoria":"curso"}
                ]"#,
            )
            .unwrap();

        let report = service.migrate_events().unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, Some(2));
    }

    #[test]
    fn test_migration_runs_once() {
        let service = service();
        service
            .store()
            .save_raw(
                keys::EVENTS,
                r#"[{"id":1,"titulo":"Antigo","data":"d","horario":"14:00 - 17:00","local":"l","participantes":1,"descricao":"x","categoria":"curso"}]"#,
            )
            .unwrap();

        let first = service.migrate_events().unwrap();
        assert_eq!(first.migrated, 1);

        // The version marker makes the second pass a no-op.
        let second = service.migrate_events().unwrap();
        assert_eq!(second, MigrationReport::default());
    }

    #[test]
    fn test_migration_on_empty_store_sets_marker() {
        let service = service();
        let report = service.migrate_events().unwrap();
        assert_eq!(report, MigrationReport::default());

        let version: Option<i32> = service.store().load(keys::EVENTS_SCHEMA_VERSION).unwrap();
        assert_eq!(version, Some(EVENTS_SCHEMA_CURRENT));
    }
}
