//! Dev-mode demo data
//!
//! Seeds a handful of users and one project so a fresh `--dev-mode`
//! gateway can be exercised with curl immediately. Never runs in
//! production mode.

use tracing::{info, warn};

use crate::auth::{Actor, Permission};
use crate::registrar::NewProject;
use crate::server::AppState;

pub const DEMO_ADMIN: &str = "demo-admin";
pub const DEMO_WRITER: &str = "demo-writer";
pub const DEMO_READER: &str = "demo-reader";

/// Seed demo users and a demo project through the regular service
/// paths, so the seeded records behave exactly like user-created ones.
pub fn seed_demo_data(state: &AppState) {
    let admin = Actor::User(DEMO_ADMIN.to_string());

    let project = match state.registrar.create_project(
        &admin,
        NewProject {
            title: "Demo: semantic priming replication".to_string(),
            description: "Throwaway dev-mode project for poking at the draft lifecycle"
                .to_string(),
            category: "project".to_string(),
            is_public: false,
        },
    ) {
        Ok(p) => p,
        Err(e) => {
            warn!("Demo seed skipped: {}", e);
            return;
        }
    };

    for (user, level) in [
        (DEMO_WRITER, Permission::Write),
        (DEMO_READER, Permission::Read),
    ] {
        if let Err(e) = state
            .registrar
            .set_contributor(&admin, &project.id, user, level)
        {
            warn!("Demo contributor {} not added: {}", user, e);
        }
    }

    info!(
        project = %project.id,
        "Demo data seeded ({} can admin, {} can write, {} can read)",
        DEMO_ADMIN,
        DEMO_WRITER,
        DEMO_READER
    );
}
