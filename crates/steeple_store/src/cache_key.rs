/// Deterministic filesystem key for a source URL: the `http://` or
/// `https://` prefix is stripped and every character outside
/// `[0-9A-Za-z_-]` is removed.
///
/// Two distinct URLs can sanitize to the same key and will silently
/// overwrite each other's cache file. Known limitation; a product decision
/// on hashing the full URL is pending.
pub fn sanitize(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}
