//! Access control policy.
//!
//! A single pure decision function maps `(actor, verb, resource, owner)` to
//! allow or deny. Handlers call it before touching storage so a denied
//! request never mutates anything.

use crate::user::Actor;

/// What the request wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Verb {
    /// Safe verbs never mutate state.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// What the request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Genre,
    Title,
    Review,
    Comment,
    /// The user collection and individual users, addressed by username.
    User,
    /// The actor's own profile (`/users/me/`).
    Me,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    #[error("authentication required")]
    Unauthenticated,
    #[error("permission denied")]
    Forbidden,
}

/// Decide whether `actor` may apply `verb` to `resource`.
///
/// `owner_id` is the author of the target object for review and comment
/// updates/deletes; it is ignored elsewhere. Anonymous actors that fail a
/// rule get [`Denied::Unauthenticated`], authenticated ones
/// [`Denied::Forbidden`].
pub fn authorize(
    actor: Option<&Actor>,
    verb: Verb,
    resource: Resource,
    owner_id: Option<i32>,
) -> Result<(), Denied> {
    match resource {
        Resource::Category | Resource::Genre | Resource::Title => {
            if verb.is_safe() {
                return Ok(());
            }
            let actor = actor.ok_or(Denied::Unauthenticated)?;
            if actor.is_admin() {
                Ok(())
            } else {
                Err(Denied::Forbidden)
            }
        }
        Resource::Review | Resource::Comment => {
            if verb.is_safe() {
                return Ok(());
            }
            let actor = actor.ok_or(Denied::Unauthenticated)?;
            match verb {
                Verb::Create => Ok(()),
                _ => {
                    let is_author = owner_id == Some(actor.user_id);
                    if is_author || actor.is_moderator() || actor.is_admin() {
                        Ok(())
                    } else {
                        Err(Denied::Forbidden)
                    }
                }
            }
        }
        Resource::User => {
            let actor = actor.ok_or(Denied::Unauthenticated)?;
            if actor.is_admin() {
                Ok(())
            } else {
                Err(Denied::Forbidden)
            }
        }
        Resource::Me => match verb {
            Verb::Retrieve | Verb::Update => actor.map(|_| ()).ok_or(Denied::Unauthenticated),
            _ => Err(if actor.is_some() {
                Denied::Forbidden
            } else {
                Denied::Unauthenticated
            }),
        },
    }
}
