use models::User;

/// Lifecycle stage of the session state machine.
///
/// `Authenticating`, `Revalidating` and `LoggingOut` are transient; the other
/// two are the stable at-rest states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
    Revalidating,
    LoggingOut,
}

/// Snapshot of the authenticated-user state, published by [`SessionManager`]
/// through a watch channel. Consumers treat it as read-only.
///
/// `user` is only ever present while the last validation of `token` succeeded;
/// `is_loading` is true exactly while a lifecycle transition is in flight.
///
/// [`SessionManager`]: crate::SessionManager
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub stage: Stage,
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_loading: bool,
    pub last_error: Option<String>,

    /// Failed attempts within the current revalidation event.
    pub retries: u32,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.stage, Stage::Authenticated)
    }
}
