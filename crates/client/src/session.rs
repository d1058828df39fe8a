//! Session gate: resolves the signed-in identity to exactly one portal state.
//!
//! The gate is the first stage of the portal flow. It combines the current
//! session with the entity lookup scoped to that identity and lands on one
//! of the [`GateState`] alternates. Zero linked projects is a displayable
//! state, not an error; a wrong-role session is force-terminated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atrium_core::roles::ROLE_ADMIN;

use crate::backend::{PortalBackend, ProjectRecord, SessionUser, SignupInput};

/// Message shown when a session carries the wrong role for this portal.
pub const ACCESS_DENIED: &str = "ACCESS DENIED: Insufficient clearance level.";

/// What to do when the entity lookup returns more than one project for a
/// client identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Take the most recently created project and surface a data-integrity
    /// warning in [`GateState::Ready::duplicate_warning`].
    #[default]
    MostRecentCreated,
    /// Refuse to resolve; the duplicate rows need operator attention first.
    Strict,
}

/// The resolved portal state. Exactly one alternate at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    /// No session, or a surfaced backend failure. The error message is the
    /// backend's verbatim; the gate never retries on its own.
    Unauthenticated { error: Option<String> },
    /// A valid session with the wrong role for this portal. The session has
    /// already been terminated by the time this state is returned.
    AccessDenied { message: String },
    /// Authenticated, but no project is linked to this identity.
    NoLinkedProject { email: String },
    /// Authenticated with a resolved project.
    Ready {
        user: SessionUser,
        project: ProjectRecord,
        /// Set when more than one project matched a client identity and
        /// [`SelectionPolicy::MostRecentCreated`] picked one.
        duplicate_warning: bool,
    },
}

/// Resolves sessions to portal states against an injected backend.
pub struct SessionGate {
    backend: Arc<dyn PortalBackend>,
    required_role: &'static str,
    policy: SelectionPolicy,
    loading: AtomicBool,
}

impl SessionGate {
    /// Create a gate for a portal that admits only `required_role`
    /// (`"client"` for the client portal, `"admin"` for the console).
    pub fn new(backend: Arc<dyn PortalBackend>, required_role: &'static str) -> Self {
        Self {
            backend,
            required_role,
            policy: SelectionPolicy::default(),
            loading: AtomicBool::new(false),
        }
    }

    /// Override the duplicate-project policy.
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `true` while a resolution is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Mount-time resolution: look up the current session and, if one
    /// exists, run the entity fetch for it.
    pub async fn resolve(&self) -> GateState {
        self.guarded(async {
            match self.backend.current_session().await {
                Ok(Some(user)) => self.admit(user).await,
                Ok(None) => GateState::Unauthenticated { error: None },
                Err(e) => GateState::Unauthenticated {
                    error: Some(e.to_string()),
                },
            }
        })
        .await
    }

    /// Sign in and resolve. Auth failures surface the backend's message
    /// verbatim in the unauthenticated state.
    pub async fn sign_in(&self, email: &str, password: &str) -> GateState {
        self.guarded(async {
            match self.backend.sign_in(email, password).await {
                Ok(user) => self.admit(user).await,
                Err(e) => GateState::Unauthenticated {
                    error: Some(e.to_string()),
                },
            }
        })
        .await
    }

    /// Sign up and resolve.
    pub async fn sign_up(&self, input: SignupInput) -> GateState {
        self.guarded(async {
            match self.backend.sign_up(input).await {
                Ok(user) => self.admit(user).await,
                Err(e) => GateState::Unauthenticated {
                    error: Some(e.to_string()),
                },
            }
        })
        .await
    }

    /// Disconnect. Always lands on the unauthenticated state, even if the
    /// server-side revoke fails.
    pub async fn sign_out(&self) -> GateState {
        if let Err(e) = self.backend.sign_out().await {
            tracing::warn!(error = %e, "Sign-out did not complete cleanly");
        }
        GateState::Unauthenticated { error: None }
    }

    async fn guarded(&self, fut: impl std::future::Future<Output = GateState>) -> GateState {
        self.loading.store(true, Ordering::SeqCst);
        let state = fut.await;
        self.loading.store(false, Ordering::SeqCst);
        state
    }

    /// Role-check the user, then run the entity fetch for their scope.
    async fn admit(&self, user: SessionUser) -> GateState {
        if user.role != self.required_role {
            // Wrong portal for this account; terminate the session so the
            // stale token cannot be reused here.
            if let Err(e) = self.backend.sign_out().await {
                tracing::warn!(error = %e, "Forced sign-out did not complete cleanly");
            }
            return GateState::AccessDenied {
                message: ACCESS_DENIED.to_string(),
            };
        }

        let lookup = if self.required_role == ROLE_ADMIN {
            self.backend.all_projects().await
        } else {
            self.backend.my_projects().await
        };

        let projects = match lookup {
            Ok(projects) => projects,
            Err(e) => {
                return GateState::Unauthenticated {
                    error: Some(e.to_string()),
                }
            }
        };

        self.select(user, projects)
    }

    /// Pick the project for this session from the fetched set.
    ///
    /// Admins routinely see many projects and get the newest preselected.
    /// For a client identity more than one linked project is a data
    /// anomaly, handled per [`SelectionPolicy`].
    fn select(&self, user: SessionUser, projects: Vec<ProjectRecord>) -> GateState {
        let is_client_scope = self.required_role != ROLE_ADMIN;
        let duplicate = is_client_scope && projects.len() > 1;

        if duplicate {
            tracing::warn!(
                email = %user.email,
                count = projects.len(),
                "Multiple projects linked to one client identity"
            );
            if self.policy == SelectionPolicy::Strict {
                return GateState::Unauthenticated {
                    error: Some(format!(
                        "Multiple projects are linked to {}; contact support",
                        user.email
                    )),
                };
            }
        }

        // The server orders newest-first, but selection must not depend on
        // transport order.
        match projects.into_iter().max_by_key(|p| (p.created_at, p.id)) {
            Some(project) => GateState::Ready {
                user,
                project,
                duplicate_warning: duplicate,
            },
            None => GateState::NoLinkedProject { email: user.email },
        }
    }
}
