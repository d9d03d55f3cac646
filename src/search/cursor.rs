use crate::search::filter::SongFilter;
use crate::search::keyset::Page;

/// Relative URL of the page after `page` on `route`, or `None` once a listing is
/// exhausted.
///
/// Parameters are emitted as `previous_id`, `limit`, then `message` and `word`
/// when the request carried them.
pub fn continuation_uri(route: &str, page: &Page, limit: usize, filter: &SongFilter) -> Option<String> {
    let cursor = page.next_cursor?.to_string();
    let limit = limit.to_string();

    let mut params: Vec<(&str, &str)> = vec![("previous_id", cursor.as_str()), ("limit", limit.as_str())];
    if let Some(message) = &filter.message {
        params.push(("message", message.as_str()));
    }
    if let Some(word) = &filter.word {
        params.push(("word", word.as_str()));
    }

    // Only &str pairs go in, which always encode
    let query = serde_urlencoded::to_string(&params).ok()?;
    Some(format!("{}?{}", route, query))
}
