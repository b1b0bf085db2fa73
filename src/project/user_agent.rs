//! User-agent decomposition.
//!
//! Splits a raw user-agent string into a browser family, an OS family, and
//! an integer major version. Decomposition is all-or-nothing: if any of the
//! three parts cannot be determined, [`parse`] returns `None` and the caller
//! falls back to the raw string.

/// Decomposed user-agent triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent {
    /// Browser family, e.g. `Firefox`.
    pub browser: String,
    /// Operating system family, e.g. `Windows`.
    pub os: String,
    /// Integer major version of the browser.
    pub version: i64,
}

/// Browser product tokens in match precedence order.
///
/// Families that embed other families' tokens come first: Edge and Opera
/// user agents contain `Chrome`, Chrome user agents contain `Safari`.
/// `Edge` (legacy) must precede `Edg` (Chromium-based) so the version
/// separator lines up.
const BROWSERS: &[(&str, &str)] = &[
    ("Edge", "Edge"),
    ("Edg", "Edge"),
    ("OPR", "Opera"),
    ("Opera", "Opera"),
    ("Firefox", "Firefox"),
    ("Chrome", "Chrome"),
    ("Safari", "Safari"),
    ("MSIE", "MSIE"),
];

/// OS fragments in match precedence order.
///
/// iPhone and iPad agents also contain `Mac OS X`; Android agents also
/// contain `Linux`. The more specific fragment must come first. Firefox OS
/// agents carry a bare `Mobile` or `Tablet` token with no platform fragment,
/// so those entries must stay last.
const OS_FAMILIES: &[(&str, &str)] = &[
    ("Windows", "Windows"),
    ("iPhone", "iPhone"),
    ("iPad", "iPad"),
    ("Mac OS X", "Macintosh"),
    ("Macintosh", "Macintosh"),
    ("Android", "Android"),
    ("CrOS", "Chrome OS"),
    ("Linux", "Linux"),
    ("FreeBSD", "FreeBSD"),
    ("Mobile", "Firefox OS"),
    ("Tablet", "Firefox OS"),
];

/// Decompose a raw user-agent string.
///
/// Returns `None` unless a browser family, its integer major version, and an
/// OS family are all recognized.
pub fn parse(raw: &str) -> Option<UserAgent> {
    let (token, family) = BROWSERS
        .iter()
        .find(|(token, _)| raw.contains(token))
        .copied()?;

    // Safari reports its real version in a separate `Version/` product;
    // the `Safari/` token carries the WebKit build number.
    let version = if family == "Safari" && raw.contains("Version/") {
        major_version(raw, "Version")?
    } else {
        major_version(raw, token)?
    };

    let os = OS_FAMILIES
        .iter()
        .find(|(fragment, _)| raw.contains(fragment))
        .map(|(_, family)| (*family).to_string())?;

    Some(UserAgent {
        browser: family.to_string(),
        os,
        version,
    })
}

/// Integer major version following `token`, separated by `/` or a space.
fn major_version(raw: &str, token: &str) -> Option<i64> {
    let after = &raw[raw.find(token)? + token.len()..];
    let after = after
        .strip_prefix('/')
        .or_else(|| after.strip_prefix(' '))?;
    let digits: &str = &after[..after
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after.len())];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
