/// Shortens a response body for log output.
pub(crate) fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 256;
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= MAX {
        return text.into_owned();
    }
    let mut out: String = text.chars().take(MAX).collect();
    out.push_str("...");
    out
}
