//! Draft-to-registration lifecycle
//!
//! The registrar owns the whole path from a mutable draft to an
//! immutable registration:
//!
//! 1. A draft is branched from a project against a metaschema.
//! 2. The initiator edits it (schema swap, wholesale metadata replace).
//! 3. Freeze-initiate hands back a confirmation token bound to
//!    (draft, user). Nothing changes yet.
//! 4. Freeze-confirm verifies the token, snapshots the project, and
//!    consumes the draft. One draft, one registration, ever.

pub mod service;
pub mod token;

pub use service::{
    DraftUpdate, FreezeChoice, FreezeTicket, NewDraft, NewProject, RegistrarService,
};
pub use token::TokenService;
