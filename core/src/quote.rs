use std::borrow::Cow;

/// Wraps `argument` in quotes if it contains whitespace or a double quote.
///
/// Arguments that already start and end with the same quote character are
/// returned untouched. Only the first and last characters are inspected, so
/// `"a" b"` is treated as already quoted. Arguments containing a double quote
/// are wrapped in single quotes; nothing is escaped, so a value containing
/// both quote kinds cannot be represented faithfully.
///
/// Absent values stay absent: use `Option::map(quote)`.
pub fn quote(argument: &str) -> Cow<'_, str> {
    if !needs_quoting(argument) {
        return Cow::Borrowed(argument);
    }

    if is_wrapped_in(argument, '"') || is_wrapped_in(argument, '\'') {
        return Cow::Borrowed(argument);
    }

    if argument.contains('"') {
        Cow::Owned(format!("'{argument}'"))
    } else {
        Cow::Owned(format!("\"{argument}\""))
    }
}

/// Undoes display quoting for a token handed straight to the OS.
///
/// A launcher that receives a joined command string would strip these quotes
/// while splitting it; a spawned argv has nobody to do that. Tokens without
/// quote characters are returned as is, so Windows paths keep their
/// backslashes. Tokens that do not parse as a single word stay verbatim.
pub fn unquote(token: &str) -> Cow<'_, str> {
    if !token.contains(['"', '\'']) {
        return Cow::Borrowed(token);
    }
    match shlex::split(token).as_deref() {
        Some([word]) => Cow::Owned(word.clone()),
        _ => Cow::Borrowed(token),
    }
}

/// Splits a runtime option string such as `-Xmx640m -Xss2m` into tokens.
///
/// Falls back to whitespace splitting when the quotes do not balance.
pub fn split_options(options: &str) -> Vec<String> {
    shlex::split(options)
        .unwrap_or_else(|| options.split_whitespace().map(str::to_string).collect())
}

fn needs_quoting(argument: &str) -> bool {
    argument.chars().any(|c| c.is_whitespace() || c == '"')
}

fn is_wrapped_in(argument: &str, quote_char: char) -> bool {
    argument.starts_with(quote_char) && argument.ends_with(quote_char)
}
