//! Message localization seam.
//!
//! Message keys are the English source strings, using printf-style
//! placeholders: `%s`, `%d` for sequential arguments and `%1$s`, `%2$d`
//! for positional ones.

pub const MSG_AUTH_FAILED: &str = "WSSE authentication failed.";
pub const MSG_MISSING_NAME: &str = "Error: New name not specified.";
pub const MSG_NO_TAGS: &str = "No tags could be found to match the query criteria.";
pub const MSG_DELETED_ONE: &str = "Tag %1$s has been deleted.";
pub const MSG_DELETED_MANY: &str = "%2$d tags have been deleted.";
pub const MSG_RENAMED_ONE: &str = "Tag %1$s has been renamed to %2$s.";
pub const MSG_RENAMED_MANY: &str = "Tags %1$s have been renamed to %2$s.";
pub const MSG_REQUEST_FAILED: &str = "The tag operation could not be completed.";
pub const MSG_MANAGE_POSTS: &str = "Manage posts tagged %1$s";

pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, args: &[&str]) -> String;

    /// Choose between singular and plural forms by `count`
    fn translate_plural(&self, singular: &str, plural: &str, count: usize, args: &[&str]) -> String {
        let key = if count == 1 { singular } else { plural };
        self.translate(key, args)
    }
}

/// Catalog that serves the source strings untranslated
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceCatalog;

impl Translator for SourceCatalog {
    fn translate(&self, key: &str, args: &[&str]) -> String {
        format_message(key, args)
    }
}

/// Substitute printf-style placeholders in `template` with `args`.
///
/// Unknown or out-of-range placeholders are left as written; `%%` yields `%`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = 0;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let directive = &rest[pos + 1..];

        if let Some(after) = directive.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }

        if let Some(after) = directive.strip_prefix(['s', 'd']) {
            match args.get(next_arg) {
                Some(arg) => out.push_str(arg),
                None => out.push_str(&rest[pos..pos + 2]),
            }
            next_arg += 1;
            rest = after;
            continue;
        }

        let digits = directive.bytes().take_while(u8::is_ascii_digit).count();
        let positional = directive[digits..]
            .strip_prefix('$')
            .and_then(|after| after.strip_prefix(['s', 'd']));
        match (digits, positional) {
            (d, Some(after)) if d > 0 => {
                let index: usize = directive[..digits].parse().unwrap_or(0);
                match index.checked_sub(1).and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&rest[pos..pos + digits + 3]),
                }
                rest = after;
            }
            _ => {
                out.push('%');
                rest = directive;
            }
        }
    }

    out.push_str(rest);
    out
}
