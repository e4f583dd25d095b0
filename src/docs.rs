use crate::api::attendance::{AdjustTime, MarkTeacher, SignIn, TableEdits};
use crate::api::cahiers::{CahierResponse, CreateCahier, NewUncorrectedLesson};
use crate::api::calendar::CreateOverride;
use crate::api::devoir::CreateDevoir;
use crate::api::journal::CreateJournalEntry;
use crate::api::materials::CreateMaterial;
use crate::api::rapports::{CreateDelivery, CreateRapport};
use crate::api::teachers::CreateTeacher;
use crate::attendance::reconcile::{ProposedRow, Reconciliation, Rejection, RejectionReason, Upsert};
use crate::attendance::roster::RosterRow;
use crate::attendance::service::TableOutcome;
use crate::model::attendance::{AttendanceHistoryEntry, AttendanceRecord, AttendanceStatus};
use crate::model::cahier::{Cahier, UncorrectedLesson};
use crate::model::calendar::{CalendarOverride, OverrideKind};
use crate::model::devoir::Devoir;
use crate::model::journal::JournalEntry;
use crate::model::material::MaterialEntry;
use crate::model::notice::RenderedNotice;
use crate::model::rapport::{Rapport, RapportDelivery};
use crate::model::teacher::Teacher;
use crate::utils::pending_store::PendingOverwrite;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PerfMan Lite API",
        version = "1.0.0",
        description = r#"
## School staff performance tracker

Daily teacher attendance plus the follow-up registers an inspector keeps.

### Key Features
- **Attendance**
  - Sign-in with automatic Present / Late / VeryLate classification
  - Overwrite confirmation when a teacher is already recorded for the day
  - Bulk table edits, reconciled against the stored day before saving
- **Teachers**
  - Roster, assigned classes, attendance history
- **Registers**
  - Journal, notebook inspections (cahiers), material handouts,
    rapports and their deliveries, weekly homework (devoir)
- **Calendar**
  - Vacation and extra working day overrides

### Response Format
- JSON bodies; errors carry a `message`
- Attendance writes return `notices` to show to the operator

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::classify_time,
        crate::api::attendance::adjust_time,
        crate::api::attendance::day_records,
        crate::api::attendance::roster,
        crate::api::attendance::sign_in,
        crate::api::attendance::confirm_pending,
        crate::api::attendance::cancel_pending,
        crate::api::attendance::mark,
        crate::api::attendance::preview_table,
        crate::api::attendance::save_table,
        crate::api::attendance::teacher_history,

        crate::api::teachers::list_teachers,
        crate::api::teachers::create_teacher,
        crate::api::teachers::update_teacher,
        crate::api::teachers::delete_teacher,
        crate::api::teachers::teacher_classes,

        crate::api::journal::create_entry,
        crate::api::journal::list_entries,

        crate::api::cahiers::create_cahier,
        crate::api::cahiers::list_cahiers,

        crate::api::materials::create_material,
        crate::api::materials::list_materials,

        crate::api::rapports::create_rapport,
        crate::api::rapports::list_rapports,
        crate::api::rapports::update_rapport,
        crate::api::rapports::delete_rapport,
        crate::api::rapports::create_delivery,
        crate::api::rapports::list_deliveries,

        crate::api::devoir::create_devoir,
        crate::api::devoir::list_devoir,

        crate::api::calendar::create_override,
        crate::api::calendar::list_overrides,
        crate::api::calendar::delete_override
    ),
    components(
        schemas(
            AttendanceStatus,
            AttendanceRecord,
            AttendanceHistoryEntry,
            AdjustTime,
            SignIn,
            MarkTeacher,
            TableEdits,
            ProposedRow,
            Upsert,
            RejectionReason,
            Rejection,
            Reconciliation,
            TableOutcome,
            RosterRow,
            RenderedNotice,
            PendingOverwrite,
            Teacher,
            CreateTeacher,
            JournalEntry,
            CreateJournalEntry,
            Cahier,
            UncorrectedLesson,
            CahierResponse,
            CreateCahier,
            NewUncorrectedLesson,
            MaterialEntry,
            CreateMaterial,
            Rapport,
            RapportDelivery,
            CreateRapport,
            CreateDelivery,
            Devoir,
            CreateDevoir,
            OverrideKind,
            CalendarOverride,
            CreateOverride
        )
    ),
    tags(
        (name = "Attendance", description = "Daily sign-in and attendance table"),
        (name = "Teacher", description = "Teacher roster"),
        (name = "Journal", description = "Class journal register"),
        (name = "Cahier", description = "Notebook inspections"),
        (name = "Material", description = "Material handouts"),
        (name = "Rapport", description = "Rapports and their deliveries"),
        (name = "Devoir", description = "Weekly homework deliveries"),
        (name = "Calendar", description = "Vacation and working day overrides"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/attendance/{date}",
            "/api/attendance/pending/{token}",
            "/api/teachers/by-name/{name}/classes",
            "/api/deliveries",
            "/api/calendar/overrides/{override_id}",
        ] {
            assert!(paths.contains_key(path), "{path} missing from openapi");
        }
    }
}
