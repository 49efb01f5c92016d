/// Minimum username length accepted at signup
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length accepted at signup
pub const USERNAME_MAX_LEN: usize = 20;

/// Minimum password length accepted at signup
pub const PASSWORD_MIN_LEN: usize = 6;

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Characters the hosted store refuses inside a path segment.
/// `/` is the path separator itself.
pub const RESERVED_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Maximum video id length (YouTube ids are 11)
pub const VIDEO_ID_MAX_LEN: usize = 64;

/// Literal markers substituted for reserved characters in usernames
pub const USERNAME_MARKERS: [(char, &str); 6] = [
    ('.', "_DOT_"),
    ('@', "_AT_"),
    ('#', "_HASH_"),
    ('$', "_DOLLAR_"),
    ('[', "_LBRACKET_"),
    (']', "_RBRACKET_"),
];

// =============================================================================
// Store layout
// =============================================================================

/// Root node holding one child per encoded username
pub const USERS_ROOT: &str = "users";

/// Root node holding one child per owner segment, each holding videos
pub const VIDEOS_ROOT: &str = "videos";

/// Owner segment for videos saved without a username.
/// The hyphen keeps it outside the encoded-username alphabet.
pub const SHARED_OWNER_SEGMENT: &str = "-shared";

// =============================================================================
// Title lookup
// =============================================================================

/// Title stored when the oEmbed lookup fails
pub const FALLBACK_TITLE: &str = "Untitled Video";

/// Default oEmbed endpoint
pub const DEFAULT_TITLE_LOOKUP_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Default title lookup timeout (seconds)
pub const DEFAULT_TITLE_LOOKUP_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Error Messages
// =============================================================================

/// Signup username rule
pub const ERR_INVALID_USERNAME: &str =
    "Username must be 3-20 characters of letters, digits or underscore";

/// Signup password rule
pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// Login or signup body without both credentials
pub const ERR_MISSING_CREDENTIALS: &str = "Username and password are required";

/// POST /videos body without its identifying fields
pub const ERR_MISSING_VIDEO_FIELDS: &str = "Missing required fields: videoId and youtubeUrl";

/// Listing or deleting without an owner
pub const ERR_MISSING_USERNAME: &str = "Missing required query parameter: username";

/// Video id unusable as a path segment
pub const ERR_INVALID_VIDEO_ID: &str = "videoId must be 1-64 characters of letters, digits, _ or -";
