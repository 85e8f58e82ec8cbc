//! Named checks gating a command.
//!
//! Checks run in registration order on both the slash path and the
//! component path. The first failing check stops evaluation and its name
//! (and reason, when one was given) is reported to the user.

use std::fmt;
use std::sync::Arc;

use tessera_core::Permission;

use crate::command::validate_name;
use crate::context::InteractionContext;
use crate::error::{CheckFailure, ConfigurationError};

/// Predicate evaluated by a [`Check`].
pub type CheckFn = Arc<dyn Fn(&dyn InteractionContext) -> bool + Send + Sync>;

/// A named, side-effect-free predicate.
#[derive(Clone)]
pub struct Check {
    name: String,
    reason: Option<String>,
    predicate: CheckFn,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl Check {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn InteractionContext) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            reason: None,
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn evaluate(&self, ctx: &dyn InteractionContext) -> Result<(), CheckFailure> {
        if (self.predicate)(ctx) {
            Ok(())
        } else {
            Err(CheckFailure {
                name: self.name.clone(),
                reason: self.reason.clone(),
            })
        }
    }
}

/// Runs `checks` in order, stopping at the first failure.
pub fn run_checks(checks: &[Check], ctx: &dyn InteractionContext) -> Result<(), CheckFailure> {
    checks.iter().try_for_each(|check| check.evaluate(ctx))
}

/// Collects the checks of one command.
///
/// ```rust,ignore
/// SlashCommand::new("ban", "Ban a member").checks(|c| {
///     c.guild_only()
///         .require_permissions(&[Permission::BanMembers])
///         .check_with_reason("not_self", "You cannot ban yourself.", |ctx| {
///             ctx.user().name != "self"
///         });
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChecksScope {
    checks: Vec<Check>,
}

impl ChecksScope {
    pub fn check<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&dyn InteractionContext) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check::new(name, predicate));
        self
    }

    pub fn check_with_reason<F>(
        &mut self,
        name: impl Into<String>,
        reason: impl Into<String>,
        predicate: F,
    ) -> &mut Self
    where
        F: Fn(&dyn InteractionContext) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check::new(name, predicate).with_reason(reason));
        self
    }

    pub fn add(&mut self, check: Check) -> &mut Self {
        self.checks.push(check);
        self
    }

    /// The invoker must be a guild administrator.
    pub fn require_administrator(&mut self) -> &mut Self {
        self.check_with_reason(
            "administrator",
            "This command requires administrator permissions.",
            |ctx| ctx.member().is_some_and(|m| m.is_administrator()),
        )
    }

    /// The invoker must be one of the configured application owners.
    pub fn require_application_owner(&mut self) -> &mut Self {
        self.check_with_reason(
            "application_owner",
            "Only the owners of this application may use this command.",
            |ctx| ctx.is_application_owner(),
        )
    }

    /// The invoker must hold every listed guild permission.
    pub fn require_permissions(&mut self, permissions: &[Permission]) -> &mut Self {
        let permissions = permissions.to_vec();
        self.check_with_reason(
            "permissions",
            "You are missing permissions required by this command.",
            move |ctx| {
                ctx.member()
                    .is_some_and(|m| permissions.iter().all(|p| m.has_permission(*p)))
            },
        )
    }

    /// The command may not be used in direct messages.
    pub fn guild_only(&mut self) -> &mut Self {
        self.check_with_reason(
            "guild_only",
            "This command can only be used in a server.",
            |ctx| !ctx.is_dm(),
        )
    }

    /// Bots may not invoke the command.
    pub fn reject_bots(&mut self) -> &mut Self {
        self.check("reject_bots", |ctx| !ctx.user().bot)
    }

    pub(crate) fn into_checks(self, command: &str) -> Result<Vec<Check>, ConfigurationError> {
        for (i, check) in self.checks.iter().enumerate() {
            validate_name("check", &check.name)?;
            if self.checks[..i].iter().any(|c| c.name == check.name) {
                return Err(ConfigurationError::DuplicateCheck {
                    command: command.to_string(),
                    check: check.name.clone(),
                });
            }
        }
        Ok(self.checks)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tessera_core::{ChannelId, GuildId, Member, Reply, ReplyResult, User, UserId};

    use super::*;

    struct StubContext {
        user: User,
        member: Option<Member>,
        guild: Option<GuildId>,
        owners: Vec<UserId>,
    }

    impl StubContext {
        fn dm(user: User) -> Self {
            Self {
                user,
                member: None,
                guild: None,
                owners: Vec::new(),
            }
        }

        fn guild(user: User, permissions: Vec<Permission>) -> Self {
            Self {
                member: Some(Member {
                    permissions,
                    ..Member::default()
                }),
                guild: Some(GuildId(1)),
                ..Self::dm(user)
            }
        }
    }

    #[async_trait]
    impl InteractionContext for StubContext {
        fn interaction_id(&self) -> &str {
            "i-1"
        }

        fn user(&self) -> &User {
            &self.user
        }

        fn member(&self) -> Option<&Member> {
            self.member.as_ref()
        }

        fn guild_id(&self) -> Option<GuildId> {
            self.guild
        }

        fn channel_id(&self) -> Option<ChannelId> {
            None
        }

        fn command_name(&self) -> &str {
            "stub"
        }

        fn application_owners(&self) -> &[UserId] {
            &self.owners
        }

        async fn reply(&self, _reply: Reply) -> ReplyResult<()> {
            Ok(())
        }
    }

    fn scope(build: impl FnOnce(&mut ChecksScope)) -> Vec<Check> {
        let mut scope = ChecksScope::default();
        build(&mut scope);
        scope.into_checks("stub").unwrap()
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let checks = scope(|c| {
            c.check("first", |_| true)
                .check_with_reason("second", "nope", |_| false)
                .check("third", move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                });
        });

        let ctx = StubContext::dm(User::new(1, "alice"));
        let failure = run_checks(&checks, &ctx).unwrap_err();
        assert_eq!(failure.name, "second");
        assert_eq!(failure.reason.as_deref(), Some("nope"));
        assert_eq!(failure.to_string(), "check failed: second");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_premade_guild_checks() {
        let checks = scope(|c| {
            c.guild_only()
                .require_permissions(&[Permission::ManageMessages]);
        });

        let dm = StubContext::dm(User::new(1, "alice"));
        assert_eq!(run_checks(&checks, &dm).unwrap_err().name, "guild_only");

        let plain = StubContext::guild(User::new(1, "alice"), vec![Permission::SendMessages]);
        assert_eq!(run_checks(&checks, &plain).unwrap_err().name, "permissions");

        let moderator = StubContext::guild(User::new(1, "alice"), vec![Permission::ManageMessages]);
        assert!(run_checks(&checks, &moderator).is_ok());

        let admin = StubContext::guild(User::new(1, "alice"), vec![Permission::Administrator]);
        assert!(run_checks(&checks, &admin).is_ok());
    }

    #[test]
    fn test_administrator_and_owner_checks() {
        let checks = scope(|c| {
            c.require_administrator();
        });
        let member = StubContext::guild(User::new(1, "alice"), vec![Permission::BanMembers]);
        assert!(run_checks(&checks, &member).is_err());

        let checks = scope(|c| {
            c.require_application_owner();
        });
        let mut ctx = StubContext::dm(User::new(7, "owner"));
        assert!(run_checks(&checks, &ctx).is_err());
        ctx.owners.push(UserId(7));
        assert!(run_checks(&checks, &ctx).is_ok());
    }

    #[test]
    fn test_reject_bots() {
        let checks = scope(|c| {
            c.reject_bots();
        });
        assert!(run_checks(&checks, &StubContext::dm(User::new(1, "alice"))).is_ok());
        let bot = StubContext::dm(User::new(2, "robot").as_bot());
        assert_eq!(run_checks(&checks, &bot).unwrap_err().reason, None);
    }
}
