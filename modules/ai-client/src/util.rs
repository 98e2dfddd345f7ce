/// Strip a markdown code fence (```` ```json ```` or bare ```` ``` ````) wrapped
/// around a model reply. Replies without a fence are returned trimmed.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
