use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: preserves safe tags (like <b>, <p>) while
/// stripping dangerous tags (like <script>, <iframe>) and malicious
/// attributes (like onclick). Applied to note bodies before they are stored,
/// since notes are rendered to every authenticated user.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
