//! Request payload keys arrive camelCase from the client; store columns are snake_case.

use crate::store::Row;

/// "avatarUrl" -> "avatar_url". Already snake_case input is returned unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rename every key of a payload to its column name. When both `userId` and `user_id` are given, the later key wins.
pub fn keys_to_columns(payload: Row) -> Row {
    payload
        .into_iter()
        .map(|(k, v)| (to_snake_case(&k), v))
        .collect()
}
