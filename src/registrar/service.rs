//! Registrar service
//!
//! The draft registration lifecycle in one place: create, retrieve,
//! update, soft-delete, and the two-step freeze that turns a draft into
//! an immutable registration.
//!
//! Every operation re-runs its full precondition ladder against the
//! stores; nothing is cached between requests. The ladders are ordered
//! deliberately (existence, then entity type, then permission, then
//! payload) so a caller always gets the same error kind for the same
//! situation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::auth::{require_admin, require_edit, require_view, Actor, Permission};
use crate::model::{DraftRegistration, Project, Registration, RegistrationState};
use crate::registrar::token::TokenService;
use crate::schema::SchemaRegistry;
use crate::store::{DraftStore, ProjectStore, RegistrationStore, UserStore};
use crate::types::{AmberError, Result};

/// Fields for a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_public: bool,
}

/// Fields for a new draft registration
#[derive(Debug, Clone)]
pub struct NewDraft {
    /// Project to branch from
    pub branched_from: String,
    pub schema_name: String,
    /// Required at creation; rejected after the permission gate so a
    /// malformed request still reports missing-project or forbidden first
    pub schema_version: Option<u32>,
    /// Initial form answers; defaults to an empty object
    pub registration_metadata: Option<JsonValue>,
}

/// Fields for a draft update. Patch semantics: only supplied fields
/// are touched. A supplied metadata document replaces the stored one
/// wholesale; absent keys inside it are dropped, not merged.
#[derive(Debug, Clone, Default)]
pub struct DraftUpdate {
    pub schema_name: Option<String>,
    pub schema_version: Option<u32>,
    pub registration_metadata: Option<JsonValue>,
}

/// How the registration should be minted at confirmation time
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FreezeChoice {
    /// Immediately live
    #[default]
    Immediate,
    /// Withheld until the end date (caller-supplied, must parse and lie
    /// in the future)
    Embargo { end_date: String },
    /// Await an explicit approval decision
    PendingApproval,
}

/// Result of freeze initiation: everything the caller needs for the
/// confirmation request. Initiation itself changes no state and is
/// freely repeatable.
#[derive(Debug, Clone)]
pub struct FreezeTicket {
    pub draft_id: String,
    /// Confirmation token bound to (draft, initiating user)
    pub token: String,
    /// Human warning naming the project about to be frozen
    pub warning: String,
    /// Where to send the confirmation
    pub confirm_url: String,
}

/// Draft and registration lifecycle operations over the shared stores
pub struct RegistrarService {
    projects: Arc<ProjectStore>,
    drafts: Arc<DraftStore>,
    registrations: Arc<RegistrationStore>,
    users: Arc<UserStore>,
    schemas: Arc<SchemaRegistry>,
    tokens: TokenService,
    /// External base URL used to build confirmation links
    public_url: String,
}

impl RegistrarService {
    pub fn new(
        projects: Arc<ProjectStore>,
        drafts: Arc<DraftStore>,
        registrations: Arc<RegistrationStore>,
        users: Arc<UserStore>,
        schemas: Arc<SchemaRegistry>,
        tokens: TokenService,
        public_url: String,
    ) -> Self {
        Self {
            projects,
            drafts,
            registrations,
            users,
            schemas,
            tokens,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Create a project. The creator becomes its admin contributor.
    pub fn create_project(&self, actor: &Actor, req: NewProject) -> Result<Project> {
        let user_id = actor.require_user()?;
        if req.title.trim().is_empty() {
            return Err(AmberError::Validation("title is required".to_string()));
        }

        self.users.ensure_known(user_id);
        let project = Project::new(
            req.title,
            req.description,
            req.category,
            req.is_public,
            user_id.to_string(),
        );
        info!(project = %project.id, creator = %user_id, "Project created");
        self.projects.insert(project.clone());
        Ok(project)
    }

    /// Fetch a project the actor is allowed to see
    pub fn get_project(&self, actor: &Actor, project_id: &str) -> Result<Project> {
        let project = self
            .projects
            .get_active(project_id)
            .ok_or_else(|| AmberError::NotFound("project not found".to_string()))?;
        require_view(actor, &project)?;
        Ok(project)
    }

    /// Grant or change a contributor's permission level (admin only)
    pub fn set_contributor(
        &self,
        actor: &Actor,
        project_id: &str,
        user_id: &str,
        level: Permission,
    ) -> Result<Project> {
        let project = self
            .projects
            .get_active(project_id)
            .ok_or_else(|| AmberError::NotFound("project not found".to_string()))?;
        require_admin(actor, &project)?;

        self.users.ensure_known(user_id);
        self.projects.update(project_id, |p| {
            p.set_contributor(user_id, level);
        });
        info!(
            project = %project_id,
            contributor = %user_id,
            permission = %level,
            "Contributor permission set"
        );
        self.projects
            .get_active(project_id)
            .ok_or_else(|| AmberError::Internal("project vanished during update".to_string()))
    }

    /// Soft-delete a project (admin only). Its drafts become
    /// unreachable through every draft read path.
    pub fn delete_project(&self, actor: &Actor, project_id: &str) -> Result<()> {
        let project = self
            .projects
            .get_active(project_id)
            .ok_or_else(|| AmberError::NotFound("project not found".to_string()))?;
        require_admin(actor, &project)?;

        self.projects.soft_delete(project_id);
        info!(project = %project_id, actor = %actor, "Project soft-deleted");
        Ok(())
    }

    // ========================================================================
    // Draft lifecycle
    // ========================================================================

    /// Create a draft registration branched from a project.
    ///
    /// Ladder: project exists (404) -> id is not a registration (400)
    /// -> actor can edit (403) -> version supplied (400) -> schema
    /// resolves (404) -> persist.
    pub fn create_draft(&self, actor: &Actor, req: NewDraft) -> Result<DraftRegistration> {
        let project = self.resolve_source_project(&req.branched_from)?;
        require_edit(actor, &project)?;
        let user_id = actor.require_user()?;

        let version = req.schema_version.ok_or_else(|| {
            AmberError::Validation("schemaVersion is required".to_string())
        })?;
        let schema = self.schemas.resolve(&req.schema_name, version)?;

        if let Some(ref metadata) = req.registration_metadata {
            if !metadata.is_object() {
                return Err(AmberError::Validation(
                    "registration_metadata must be an object".to_string(),
                ));
            }
        }

        self.users.ensure_known(user_id);
        let draft = DraftRegistration::new(
            project.id.clone(),
            user_id.to_string(),
            schema.name.clone(),
            schema.schema_version,
            req.registration_metadata,
        );
        info!(
            draft = %draft.id,
            project = %project.id,
            schema = %schema.name,
            initiator = %user_id,
            "Draft registration created"
        );
        self.drafts.insert(draft.clone());
        Ok(draft)
    }

    /// Retrieve a draft. Reads follow the source project's visibility:
    /// public project or any contributor level is enough, edit rights
    /// are not required to look.
    pub fn get_draft(&self, actor: &Actor, draft_id: &str) -> Result<DraftRegistration> {
        let (draft, _project) = self.resolve_draft_for_view(actor, draft_id)?;
        Ok(draft)
    }

    /// Live drafts initiated by the calling user. Drafts whose source
    /// project is gone are filtered out, not surfaced as errors.
    pub fn list_my_drafts(&self, actor: &Actor) -> Result<Vec<DraftRegistration>> {
        let user_id = actor.require_user()?;
        let drafts = self
            .drafts
            .list_by_initiator(user_id)
            .into_iter()
            .filter(|d| self.projects.get_active(&d.branched_from).is_some())
            .collect();
        Ok(drafts)
    }

    /// Live, not-yet-registered drafts branched from a project
    /// (admin only).
    pub fn list_project_drafts(
        &self,
        actor: &Actor,
        project_id: &str,
    ) -> Result<Vec<DraftRegistration>> {
        let project = self
            .projects
            .get_active(project_id)
            .ok_or_else(|| AmberError::NotFound("project not found".to_string()))?;
        require_admin(actor, &project)?;

        let drafts = self
            .drafts
            .list_by_project(project_id)
            .into_iter()
            .filter(|d| !d.is_registered())
            .collect();
        Ok(drafts)
    }

    /// Update a draft. Patch semantics: a requested schema pair is
    /// resolved against the registry (the draft's current name or
    /// version fills in a missing half) and swapped in only when it
    /// differs from the current pair; a supplied metadata document
    /// replaces the stored one wholesale; absent fields stay put.
    pub fn update_draft(
        &self,
        actor: &Actor,
        draft_id: &str,
        update: DraftUpdate,
    ) -> Result<DraftRegistration> {
        let (draft, _project) = self.resolve_draft_for_edit(actor, draft_id)?;

        let mut swap = None;
        if update.schema_name.is_some() || update.schema_version.is_some() {
            let name = update.schema_name.as_deref().unwrap_or(&draft.schema_name);
            let version = update.schema_version.unwrap_or(draft.schema_version);
            let schema = self.schemas.resolve(name, version)?;
            if draft.schema_pair() != (schema.name.as_str(), schema.schema_version) {
                swap = Some(schema);
            }
        }

        if let Some(ref metadata) = update.registration_metadata {
            if !metadata.is_object() {
                return Err(AmberError::Validation(
                    "registration_metadata must be an object".to_string(),
                ));
            }
        }

        self.drafts.update(draft_id, |d| {
            if let Some(ref schema) = swap {
                d.schema_name = schema.name.clone();
                d.schema_version = schema.schema_version;
            }
            if let Some(ref metadata) = update.registration_metadata {
                d.registration_metadata = metadata.clone();
            }
        });
        if let Some(ref schema) = swap {
            info!(
                draft = %draft_id,
                schema = %schema.name,
                version = schema.schema_version,
                "Draft schema swapped"
            );
        }

        self.drafts
            .get_active(draft_id)
            .ok_or_else(|| AmberError::Internal("draft vanished during update".to_string()))
    }

    /// Soft-delete a draft. A consumed draft cannot be deleted; the
    /// registration minted from it stands.
    pub fn delete_draft(&self, actor: &Actor, draft_id: &str) -> Result<()> {
        let (draft, _project) = self.resolve_draft_for_edit(actor, draft_id)?;

        if draft.is_registered() {
            return Err(AmberError::InvalidState(
                "draft has already been registered".to_string(),
            ));
        }

        self.drafts.soft_delete(draft_id);
        info!(draft = %draft_id, actor = %actor, "Draft registration soft-deleted");
        Ok(())
    }

    // ========================================================================
    // Two-step freeze
    // ========================================================================

    /// First half of the freeze: run the full ladder, then hand back a
    /// confirmation token bound to (draft, actor). Changes no state and
    /// may be repeated freely.
    pub fn initiate_freeze(&self, actor: &Actor, draft_id: &str) -> Result<FreezeTicket> {
        let (draft, project) = self.resolve_draft_for_edit(actor, draft_id)?;
        let user_id = actor.require_user()?;

        if draft.is_registered() {
            return Err(AmberError::InvalidState(
                "draft has already been registered".to_string(),
            ));
        }

        let token = self.tokens.mint(&draft.id, user_id)?;
        info!(draft = %draft.id, actor = %user_id, "Freeze initiated, confirmation token issued");

        Ok(FreezeTicket {
            draft_id: draft.id.clone(),
            token,
            warning: format!(
                "Freezing \"{}\" is permanent. The registered snapshot cannot be edited or deleted once confirmed.",
                project.title
            ),
            confirm_url: format!("{}/v1/drafts/{}/freeze/confirm", self.public_url, draft.id),
        })
    }

    /// Second half of the freeze: verify the token, snapshot the
    /// project, and consume the draft.
    ///
    /// Ladder: authenticated (403) -> draft and live source exist (404)
    /// -> draft not already consumed (409) -> token matches (400,
    /// `Incorrect token.`) -> actor can edit (403) -> mint state ->
    /// persist snapshot and mark the draft consumed.
    pub fn confirm_freeze(
        &self,
        actor: &Actor,
        draft_id: &str,
        token: &str,
        choice: FreezeChoice,
    ) -> Result<Registration> {
        let user_id = actor.require_user()?;

        let draft = self.resolve_draft(draft_id)?;
        let project = self
            .projects
            .get_active(&draft.branched_from)
            .ok_or_else(|| AmberError::NotFound("source project not found".to_string()))?;

        if draft.is_registered() {
            return Err(AmberError::InvalidState(
                "draft has already been registered".to_string(),
            ));
        }

        if !self.tokens.verify(&draft.id, user_id, token)? {
            warn!(draft = %draft.id, actor = %user_id, "Freeze confirmation with bad token");
            return Err(AmberError::Validation("Incorrect token.".to_string()));
        }

        require_edit(actor, &project)?;

        let state = self.state_for_choice(&choice)?;

        self.users.ensure_known(user_id);
        let registration = Registration::from_snapshot(&project, &draft, user_id, state);
        self.registrations.insert(registration.clone());
        self.drafts.mark_registered(&draft.id, &registration.id);
        info!(
            registration = %registration.id,
            draft = %draft.id,
            project = %project.id,
            actor = %user_id,
            "Registration created, draft consumed"
        );
        Ok(registration)
    }

    // ========================================================================
    // Registrations (read-only)
    // ========================================================================

    /// Fetch a registration the actor is allowed to see. A project id
    /// in this namespace is a 400, not a 404: the record exists, it is
    /// just not a registration.
    pub fn get_registration(&self, actor: &Actor, registration_id: &str) -> Result<Registration> {
        let registration = match self.registrations.get_active(registration_id) {
            Some(r) => r,
            None => {
                if self.projects.get_active(registration_id).is_some() {
                    return Err(AmberError::Validation(
                        "record is not a registration".to_string(),
                    ));
                }
                return Err(AmberError::NotFound("registration not found".to_string()));
            }
        };
        require_view(actor, &registration)?;
        Ok(registration)
    }

    /// Live registrations visible to the actor, newest first
    pub fn list_registrations(&self, actor: &Actor) -> Result<Vec<Registration>> {
        let visible = self
            .registrations
            .list_active()
            .into_iter()
            .filter(|r| crate::auth::can_view(actor, r))
            .collect();
        Ok(visible)
    }

    // ========================================================================
    // Internal resolution helpers
    // ========================================================================

    /// Resolve a project id for draft creation. A registration id here
    /// is a 400 (you cannot branch a draft from a snapshot); anything
    /// else that fails to resolve is a 404.
    fn resolve_source_project(&self, project_id: &str) -> Result<Project> {
        if let Some(project) = self.projects.get_active(project_id) {
            return Ok(project);
        }
        if self.registrations.get_active(project_id).is_some() {
            return Err(AmberError::Validation(
                "cannot create a draft from a registration".to_string(),
            ));
        }
        Err(AmberError::NotFound("project not found".to_string()))
    }

    /// Resolve a live draft. Ids from other namespaces are plain 404s:
    /// the draft namespace knows nothing about them.
    fn resolve_draft(&self, draft_id: &str) -> Result<DraftRegistration> {
        self.drafts
            .get_active(draft_id)
            .ok_or_else(|| AmberError::NotFound("draft registration not found".to_string()))
    }

    /// The shared ladder for mutating draft operations: live draft
    /// (404), live source project (404), edit permission (403).
    fn resolve_draft_for_edit(
        &self,
        actor: &Actor,
        draft_id: &str,
    ) -> Result<(DraftRegistration, Project)> {
        let draft = self.resolve_draft(draft_id)?;
        let project = self
            .projects
            .get_active(&draft.branched_from)
            .ok_or_else(|| AmberError::NotFound("source project not found".to_string()))?;
        require_edit(actor, &project)?;
        Ok((draft, project))
    }

    /// Read-side ladder: same existence checks, but gated on view.
    fn resolve_draft_for_view(
        &self,
        actor: &Actor,
        draft_id: &str,
    ) -> Result<(DraftRegistration, Project)> {
        let draft = self.resolve_draft(draft_id)?;
        let project = self
            .projects
            .get_active(&draft.branched_from)
            .ok_or_else(|| AmberError::NotFound("source project not found".to_string()))?;
        require_view(actor, &project)?;
        Ok((draft, project))
    }

    /// Turn the caller's choice into a minted state, validating the
    /// embargo end date (must parse, must lie in the future).
    fn state_for_choice(&self, choice: &FreezeChoice) -> Result<RegistrationState> {
        match choice {
            FreezeChoice::Immediate => Ok(RegistrationState::Registered),
            FreezeChoice::PendingApproval => Ok(RegistrationState::PendingApproval),
            FreezeChoice::Embargo { end_date } => {
                let end = parse_end_date(end_date).ok_or_else(|| {
                    AmberError::Validation(format!(
                        "unparsable embargo end date '{}'",
                        end_date
                    ))
                })?;
                if end <= Utc::now() {
                    return Err(AmberError::Validation(
                        "embargo end date must be in the future".to_string(),
                    ));
                }
                Ok(RegistrationState::Embargoed { end_date: end })
            }
        }
    }
}

/// Parse an embargo end date: RFC 3339 first, then a bare ISO date
/// taken as midnight UTC.
fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
