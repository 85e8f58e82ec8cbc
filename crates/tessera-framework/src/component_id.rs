//! Component identity protocol.
//!
//! A button or select menu carries an opaque `custom_id` that the platform
//! hands back, unmodified, when the component is used. [`ComponentIdentity`]
//! is the structured state this framework stores in that string: the owning
//! command, an optional restricting user, an action tag and a small payload.
//!
//! # Wire format
//!
//! ```text
//! 1|<command>|<user-or-empty>|<action>[|<key>=<value>]...#<tag>
//! ```
//!
//! - Field values escape `%`, `|`, `=` and `#` as `%25`, `%7C`, `%3D`, `%23`,
//!   so field boundaries are unambiguous and distinct identities never
//!   encode to the same string.
//! - Payload entries are written in ascending key order.
//! - `<tag>` is four lowercase hex digits derived from the body. It lets
//!   [`ComponentIdCodec::decode`] reject strings produced by other code paths
//!   and most accidental corruption.
//!
//! Decoding accepts exactly the strings [`ComponentIdentity::encode`]
//! produces. Everything else is a [`DecodeError`], never a panic.
//!
//! # Example
//!
//! ```rust,ignore
//! let id = ComponentIdentity::builder("say")
//!     .user(UserId(42))
//!     .action("delete")
//!     .build()?;
//! let custom_id = id.encode();
//! assert_eq!(ComponentIdCodec::default().decode(&custom_id)?, id);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use tessera_core::UserId;

use crate::error::{AuthorizationError, ConfigurationError, DecodeError};

/// Historical opaque-identifier limit of the reference platform.
pub const DEFAULT_MAX_LENGTH: usize = 100;

const VERSION: &str = "1";
const FIELD_SEP: char = '|';
const ENTRY_SEP: char = '=';
const TAG_SEP: char = '#';
const TAG_LEN: usize = 4;

/// The structured state behind a component's opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentIdentity {
    command: String,
    user: Option<UserId>,
    action: String,
    payload: BTreeMap<String, String>,
}

impl ComponentIdentity {
    /// Starts building an identity owned by `command`.
    pub fn builder(command: impl Into<String>) -> ComponentIdBuilder {
        ComponentIdBuilder::new(command)
    }

    /// Assembles an identity without validation. Callers guarantee the
    /// length budget, as registration does for templates.
    pub(crate) fn from_parts(
        command: String,
        user: Option<UserId>,
        action: String,
        payload: BTreeMap<String, String>,
    ) -> Self {
        Self {
            command,
            user,
            action,
            payload,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The only user allowed to use the component; `None` means anyone.
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    /// Looks up one payload entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Checks that `actor` may use this component.
    pub fn authorize(&self, actor: UserId) -> Result<(), AuthorizationError> {
        match self.user {
            Some(owner) if owner != actor => Err(AuthorizationError { owner, actor }),
            _ => Ok(()),
        }
    }

    /// Encodes the identity. Never fails.
    pub fn encode(&self) -> String {
        let mut body = String::with_capacity(32);
        body.push_str(VERSION);
        body.push(FIELD_SEP);
        escape_into(&mut body, &self.command);
        body.push(FIELD_SEP);
        if let Some(user) = self.user {
            body.push_str(&user.to_string());
        }
        body.push(FIELD_SEP);
        escape_into(&mut body, &self.action);
        for (key, value) in &self.payload {
            body.push(FIELD_SEP);
            escape_into(&mut body, key);
            body.push(ENTRY_SEP);
            escape_into(&mut body, value);
        }

        let tag = tag(&body);
        body.push(TAG_SEP);
        body.push_str(&tag);
        body
    }

    /// Length of the encoded form, in characters.
    pub fn encoded_len(&self) -> usize {
        self.encode().chars().count()
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Builds a [`ComponentIdentity`], enforcing naming rules and the length budget.
#[derive(Debug, Clone)]
pub struct ComponentIdBuilder {
    identity: ComponentIdentity,
    max_length: usize,
}

impl ComponentIdBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            identity: ComponentIdentity {
                command: command.into(),
                user: None,
                action: String::new(),
                payload: BTreeMap::new(),
            },
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Restricts the component to one user.
    pub fn user(mut self, user: impl Into<UserId>) -> Self {
        self.identity.user = Some(user.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.identity.action = action.into();
        self
    }

    /// Adds (or replaces) a payload entry.
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.identity.payload.insert(key.into(), value.to_string());
        self
    }

    /// Overrides the length budget (default [`DEFAULT_MAX_LENGTH`]).
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Validates and returns the identity.
    pub fn build(self) -> Result<ComponentIdentity, ConfigurationError> {
        let identity = self.identity;
        if identity.command.is_empty() {
            return Err(ConfigurationError::InvalidName {
                kind: "command",
                name: identity.command,
                reason: "must not be empty",
            });
        }
        if identity.action.is_empty() {
            return Err(ConfigurationError::InvalidName {
                kind: "action",
                name: identity.action,
                reason: "must not be empty",
            });
        }
        if let Some(key) = identity.payload.keys().find(|k| k.is_empty()) {
            return Err(ConfigurationError::InvalidName {
                kind: "payload key",
                name: key.clone(),
                reason: "must not be empty",
            });
        }

        let length = identity.encoded_len();
        if length > self.max_length {
            return Err(ConfigurationError::ComponentIdTooLong {
                command: identity.command,
                action: identity.action,
                length,
                limit: self.max_length,
            });
        }
        Ok(identity)
    }
}

/// Encodes and decodes identities under a fixed length budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentIdCodec {
    max_length: usize,
}

impl Default for ComponentIdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl ComponentIdCodec {
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// A builder preconfigured with this codec's budget.
    pub fn builder(&self, command: impl Into<String>) -> ComponentIdBuilder {
        ComponentIdBuilder::new(command).max_length(self.max_length)
    }

    pub fn encode(&self, identity: &ComponentIdentity) -> String {
        identity.encode()
    }

    /// Parses an untrusted identifier.
    pub fn decode(&self, input: &str) -> Result<ComponentIdentity, DecodeError> {
        // Cheap byte bound first; a char is at most four bytes.
        if input.len() > self.max_length.saturating_mul(4)
            || input.chars().count() > self.max_length
        {
            return Err(DecodeError::LengthExceeded);
        }

        let (body, found_tag) = input.rsplit_once(TAG_SEP).ok_or(DecodeError::Malformed)?;
        if found_tag.len() != TAG_LEN || found_tag != tag(body) {
            return Err(DecodeError::Malformed);
        }

        let mut fields = body.split(FIELD_SEP);
        if fields.next() != Some(VERSION) {
            return Err(DecodeError::Malformed);
        }
        let command = fields.next().map(unescape).ok_or(DecodeError::Malformed)??;
        let user = match fields.next().ok_or(DecodeError::Malformed)? {
            "" => None,
            raw => Some(raw.parse::<UserId>().map_err(|_| DecodeError::Malformed)?),
        };
        let action = fields.next().map(unescape).ok_or(DecodeError::Malformed)??;
        if command.is_empty() || action.is_empty() {
            return Err(DecodeError::Malformed);
        }

        let mut payload = BTreeMap::new();
        for entry in fields {
            let (key, value) = entry.split_once(ENTRY_SEP).ok_or(DecodeError::Malformed)?;
            let key = unescape(key)?;
            if key.is_empty() || payload.insert(key, unescape(value)?).is_some() {
                return Err(DecodeError::Malformed);
            }
        }

        let identity = ComponentIdentity {
            command,
            user,
            action,
            payload,
        };

        // Only the canonical spelling is accepted (no "+42", no reordered keys).
        if identity.encode() != input {
            return Err(DecodeError::Malformed);
        }
        Ok(identity)
    }
}

fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            '=' => out.push_str("%3D"),
            '#' => out.push_str("%23"),
            _ => out.push(ch),
        }
    }
}

fn unescape(value: &str) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escape = rest.get(pos..pos + 3).ok_or(DecodeError::Malformed)?;
        out.push(match escape {
            "%25" => '%',
            "%7C" => '|',
            "%3D" => '=',
            "%23" => '#',
            _ => return Err(DecodeError::Malformed),
        });
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Ok(out)
}

/// FNV-1a over the body, folded to 16 bits.
fn tag(body: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in body.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("{:04x}", (hash >> 16) ^ (hash & 0xffff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete_button() -> ComponentIdentity {
        ComponentIdentity::builder("say")
            .user(UserId(1))
            .action("delete")
            .build()
            .unwrap()
    }

    #[test]
    fn test_roundtrip_examples() {
        let codec = ComponentIdCodec::default();
        let identities = [
            delete_button(),
            ComponentIdentity::builder("purge")
                .action("confirm")
                .field("count", 25)
                .field("channel", "general")
                .build()
                .unwrap(),
            ComponentIdentity::builder("poll")
                .user(UserId(u64::MAX))
                .action("vote|yes")
                .field("q=1", "100% #1")
                .field("emoji", "🗳️")
                .build()
                .unwrap(),
        ];
        for identity in identities {
            let encoded = codec.encode(&identity);
            assert!(encoded.chars().count() <= codec.max_length());
            assert_eq!(codec.decode(&encoded).unwrap(), identity);
        }
    }

    #[test]
    fn test_encoded_layout() {
        let encoded = delete_button().encode();
        let (body, tag_part) = encoded.rsplit_once('#').unwrap();
        assert_eq!(body, "1|say|1|delete");
        assert_eq!(tag_part.len(), TAG_LEN);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = ComponentIdCodec::default();
        assert_eq!(codec.decode("garbage"), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_hostile_inputs_never_panic() {
        let codec = ComponentIdCodec::default();
        let inputs = [
            "",
            "#",
            "%",
            "|||#",
            "1|say||delete#",
            "1|say||delete#zzzz",
            "1|say||delete#00000",
            "1|%|1|a#0000",
            "1|%7|1|a#0000",
            "é#é",
            "help_page_2",
            "setup_private",
        ];
        for input in inputs {
            assert!(codec.decode(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_tampered_user_is_rejected() {
        let codec = ComponentIdCodec::default();
        let forged = delete_button().encode().replacen("|1|", "|2|", 1);
        assert_eq!(codec.decode(&forged), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_non_canonical_body_is_rejected() {
        let codec = ComponentIdCodec::default();
        for body in [
            "1|say|+1|delete",
            "1|say|1|delete|b=1|a=2",
            "1|say|1|delete|a=1|a=2",
            "1|say|1|delete|=1",
            "1|say|1|delete|novalue",
            "1|say|1|",
            "1||1|delete",
            "2|say|1|delete",
            "1|say|1|del%7cete",
            "1|say|x|delete",
        ] {
            let forged = format!("{body}#{}", tag(body));
            assert_eq!(codec.decode(&forged), Err(DecodeError::Malformed), "{body}");
        }
    }

    #[test]
    fn test_length_exceeded() {
        let codec = ComponentIdCodec::new(20);
        let long = "x".repeat(21);
        assert_eq!(codec.decode(&long), Err(DecodeError::LengthExceeded));
        let huge = "é".repeat(10_000);
        assert_eq!(codec.decode(&huge), Err(DecodeError::LengthExceeded));
    }

    #[test]
    fn test_distinct_identities_do_not_collide() {
        let pairs = [
            (
                ComponentIdentity::builder("a").action("b|c").build().unwrap(),
                ComponentIdentity::builder("a")
                    .action("b")
                    .field("c", "")
                    .build()
                    .unwrap(),
            ),
            (
                ComponentIdentity::builder("a")
                    .action("x")
                    .field("k", "v=w")
                    .build()
                    .unwrap(),
                ComponentIdentity::builder("a")
                    .action("x")
                    .field("k=v", "w")
                    .build()
                    .unwrap(),
            ),
            (
                ComponentIdentity::builder("a").action("x").build().unwrap(),
                ComponentIdentity::builder("a")
                    .user(UserId(0))
                    .action("x")
                    .build()
                    .unwrap(),
            ),
        ];
        for (left, right) in pairs {
            assert_ne!(left, right);
            assert_ne!(left.encode(), right.encode());
        }
    }

    #[test]
    fn test_builder_rejects_oversized_identity() {
        let err = ComponentIdentity::builder("say")
            .action("delete")
            .field("blob", "x".repeat(200))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ComponentIdTooLong { limit: 100, .. }
        ));

        let codec = ComponentIdCodec::new(10);
        assert!(codec.builder("say").action("delete").build().is_err());
    }

    #[test]
    fn test_builder_rejects_empty_names() {
        assert!(ComponentIdentity::builder("").action("a").build().is_err());
        assert!(ComponentIdentity::builder("say").build().is_err());
        assert!(
            ComponentIdentity::builder("say")
                .action("a")
                .field("", "v")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_authorize() {
        let restricted = delete_button();
        assert!(restricted.authorize(UserId(1)).is_ok());
        assert_eq!(
            restricted.authorize(UserId(2)),
            Err(AuthorizationError {
                owner: UserId(1),
                actor: UserId(2),
            })
        );

        let open = ComponentIdentity::builder("say")
            .action("delete")
            .build()
            .unwrap();
        assert!(open.authorize(UserId(2)).is_ok());
    }
}
