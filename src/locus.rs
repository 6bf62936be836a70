use nutype::nutype;

/// The organism prefix of a recognized locus tag.
const LOCUS_PREFIX: &str = "SO";

#[nutype]
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRef, Display)]
/// A canonical locus tag, as emitted in the up/down gene lists.
pub struct LocusTag(String);

/// Canonicalizes a raw locus tag.
///
/// When `apply_underscore_fix` is set and the tag starts with `SO`, contains
/// no underscore, and is longer than the bare prefix, the prefix is rewritten
/// with an underscore: `SO1427` becomes `SO_1427`. Any other tag is returned
/// unchanged, so the rewrite is idempotent.
///
/// # Examples
///
/// ```rust
/// use degsieve::locus::normalize;
///
/// assert_eq!(normalize("SO1427", true), "SO_1427");
/// assert_eq!(normalize("SO_1427", true), "SO_1427");
/// assert_eq!(normalize("SO1427", false), "SO1427");
/// ```
pub fn normalize(raw: &str, apply_underscore_fix: bool) -> String {
    if apply_underscore_fix
        && raw.starts_with(LOCUS_PREFIX)
        && !raw.contains('_')
        && raw.len() > LOCUS_PREFIX.len()
    {
        format!("{}_{}", LOCUS_PREFIX, &raw[LOCUS_PREFIX.len()..])
    } else {
        raw.to_string()
    }
}

/// Returns `true` iff `tag` belongs to the recognized identifier family,
/// i.e. starts with the `SO` organism prefix. Rows failing this check are
/// excluded from all downstream sets.
pub fn is_recognized(tag: &str) -> bool {
    tag.starts_with(LOCUS_PREFIX)
}
