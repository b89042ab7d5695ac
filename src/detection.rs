/*!
 * Target-script detection.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static ARABIC_SCRIPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Arabic}").unwrap()
});

/// Whether `text` contains at least one code point of the Arabic script
pub fn contains_target_script(text: &str) -> bool {
    ARABIC_SCRIPT_REGEX.is_match(text)
}
