/// Positional placeholder syntax understood by a driver.
///
/// Statements are always written with bare `?` tokens and rewritten by
/// [`translate`] right before they reach the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`, kept as written (MySQL)
    Question,
    /// `?1`, `?2`, ... (SQLite)
    Numbered,
}

/// Rewrite every `?` outside of quoted literals into the driver's syntax
pub fn translate(sql: &str, style: Placeholder) -> String {
    if style == Placeholder::Question {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut index = 0usize;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                out.push(ch);
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => {
                    index += 1;
                    out.push('?');
                    out.push_str(&index.to_string());
                }
                _ => out.push(ch),
            },
        }
    }

    out
}
