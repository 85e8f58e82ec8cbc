//! Identifiers and the user/member model shared by all events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Generates a transparent `u64` snowflake newtype.
macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// Identifies a platform user.
    UserId
);
snowflake!(
    /// Identifies a guild (server).
    GuildId
);
snowflake!(
    /// Identifies a channel.
    ChannelId
);
snowflake!(
    /// Identifies a role.
    RoleId
);
snowflake!(
    /// Identifies a message.
    MessageId
);

impl UserId {
    /// Length of the longest possible decimal rendering of a user id.
    pub const MAX_DISPLAY_LEN: usize = 20;
}

/// A platform user, as seen on an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Whether the account is a bot account.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    /// Marks this user as a bot account.
    pub fn as_bot(mut self) -> Self {
        self.bot = true;
        self
    }
}

/// Guild permissions relevant to command gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Administrator,
    ManageGuild,
    ManageChannels,
    ManageMessages,
    ManageRoles,
    KickMembers,
    BanMembers,
    SendMessages,
    EmbedLinks,
    MentionEveryone,
}

/// Guild-specific data for the invoking user. Absent in direct messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Member {
    /// Returns `true` if the member holds `permission`.
    ///
    /// [`Permission::Administrator`] implies every other permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| *p == permission || *p == Permission::Administrator)
    }

    pub fn is_administrator(&self) -> bool {
        self.permissions.contains(&Permission::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_parse_and_display() {
        let id: UserId = "1234567890".parse().unwrap();
        assert_eq!(id, UserId(1_234_567_890));
        assert_eq!(id.to_string(), "1234567890");
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn test_max_user_id_len() {
        assert_eq!(UserId(u64::MAX).to_string().len(), UserId::MAX_DISPLAY_LEN);
    }

    #[test]
    fn test_administrator_implies_all() {
        let admin = Member {
            permissions: vec![Permission::Administrator],
            ..Default::default()
        };
        assert!(admin.has_permission(Permission::BanMembers));

        let moderator = Member {
            permissions: vec![Permission::ManageMessages],
            ..Default::default()
        };
        assert!(moderator.has_permission(Permission::ManageMessages));
        assert!(!moderator.has_permission(Permission::BanMembers));
        assert!(!moderator.is_administrator());
    }
}
