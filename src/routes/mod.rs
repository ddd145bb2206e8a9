/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers),
/// so a protected endpoint cannot be exposed by accident.
///
/// The split mirrors the session model: everything except the login gateway
/// requires a valid session, and ownership checks happen inside the handlers.

/// Routes accessible without a session: health, login/logout, template listing.
pub mod public;

/// Routes protected by the session verifier layer. Requires a valid session
/// token; contributor/ownership checks are enforced per handler.
pub mod authenticated;
