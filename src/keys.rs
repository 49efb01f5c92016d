//! Path-safe username encoding and store path builders.
//!
//! The hosted tree refuses `. # $ [ ]` inside keys, so usernames are escaped
//! with literal markers before they become a path segment. Decoding scans left
//! to right and replaces the first marker found at each position.
//!
//! The round trip is not exact when the raw input already spells a marker
//! (`a_DOT_b` decodes to `a.b`) or when an underscore run in front of a
//! reserved character completes a different marker (`_AT.` encodes to
//! `_AT_DOT_`, which decodes to `@DOT_`). Signup only accepts `[A-Za-z0-9_]`,
//! so stored usernames are never altered by encoding; only a username that
//! literally contains a marker is ambiguous on the way back.

use crate::constants::{SHARED_OWNER_SEGMENT, USERNAME_MARKERS, USERS_ROOT, VIDEOS_ROOT};

/// Replace every reserved character with its marker
pub fn encode_username(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for c in raw.chars() {
        match USERNAME_MARKERS.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, marker)) => encoded.push_str(marker),
            None => encoded.push(c),
        }
    }
    encoded
}

/// Reverse [`encode_username`]
pub fn decode_username(token: &str) -> String {
    let mut decoded = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(c) = rest.chars().next() {
        match USERNAME_MARKERS
            .iter()
            .find(|(_, marker)| rest.starts_with(marker))
        {
            Some((reserved, marker)) => {
                decoded.push(*reserved);
                rest = &rest[marker.len()..];
            }
            None => {
                decoded.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    decoded
}

/// Which namespace a video record lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOwner {
    /// Saved on behalf of a username (stored encoded)
    User(String),
    /// Saved without a username
    Shared,
}

impl VideoOwner {
    pub fn from_username(username: Option<&str>) -> Self {
        match username {
            Some(name) => VideoOwner::User(name.to_string()),
            None => VideoOwner::Shared,
        }
    }

    /// Path segment for this owner
    pub fn segment(&self) -> String {
        match self {
            VideoOwner::User(name) => encode_username(name),
            VideoOwner::Shared => SHARED_OWNER_SEGMENT.to_string(),
        }
    }

    /// Original username, if any
    pub fn username(&self) -> Option<&str> {
        match self {
            VideoOwner::User(name) => Some(name),
            VideoOwner::Shared => None,
        }
    }
}

/// `users/<encodedUsername>`
pub fn user_path(username: &str) -> String {
    format!("{}/{}", USERS_ROOT, encode_username(username))
}

/// `videos/<ownerSegment>`
pub fn owner_videos_path(owner: &VideoOwner) -> String {
    format!("{}/{}", VIDEOS_ROOT, owner.segment())
}

/// `videos/<ownerSegment>/<videoId>`
pub fn video_path(owner: &VideoOwner, video_id: &str) -> String {
    format!("{}/{}", owner_videos_path(owner), video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_replaces_each_reserved_char() {
        assert_eq!(encode_username("a.b"), "a_DOT_b");
        assert_eq!(encode_username("me@host"), "me_AT_host");
        assert_eq!(encode_username("#1"), "_HASH_1");
        assert_eq!(encode_username("$x"), "_DOLLAR_x");
        assert_eq!(encode_username("[x]"), "_LBRACKET_x_RBRACKET_");
    }

    #[test]
    fn test_plain_usernames_unchanged() {
        assert_eq!(encode_username("abc_123"), "abc_123");
        assert_eq!(decode_username("abc_123"), "abc_123");
    }

    #[test]
    fn test_empty_passes_through() {
        assert_eq!(encode_username(""), "");
        assert_eq!(decode_username(""), "");
    }

    #[test]
    fn test_round_trip() {
        for name in [
            "abc",
            "user_name_20_chars__",
            "first.last@example.com",
            "a#b$c[d]e",
            "..@@",
            "Mixed_Case.99",
            "@DOT_",
            "#AT_x.",
            "_.",
            "ünï.côde",
        ] {
            assert_eq!(decode_username(&encode_username(name)), name, "{name}");
        }
    }

    #[test]
    fn test_literal_markers_are_ambiguous() {
        assert_eq!(decode_username("a_DOT_b"), "a.b");
        assert_eq!(decode_username(&encode_username("_AT.")), "@DOT_");
        assert_eq!(decode_username("_DOT"), "_DOT");
        assert_eq!(decode_username("__AT_"), "_@");
    }

    #[test]
    fn test_encoded_has_no_reserved_chars() {
        let encoded = encode_username("x.y@z#$[]");
        assert!(!encoded.contains(['.', '@', '#', '$', '[', ']']));
    }

    #[test]
    fn test_paths() {
        let owner = VideoOwner::User("a.b".to_string());
        assert_eq!(user_path("a.b"), "users/a_DOT_b");
        assert_eq!(owner_videos_path(&owner), "videos/a_DOT_b");
        assert_eq!(video_path(&owner, "abc123"), "videos/a_DOT_b/abc123");
        assert_eq!(
            video_path(&VideoOwner::Shared, "abc123"),
            "videos/-shared/abc123"
        );
    }

    #[test]
    fn test_owner_from_username() {
        assert_eq!(VideoOwner::from_username(None), VideoOwner::Shared);
        let owner = VideoOwner::from_username(Some("bob"));
        assert_eq!(owner.username(), Some("bob"));
    }
}
