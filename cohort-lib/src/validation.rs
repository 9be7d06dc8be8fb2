/// checks that every character of the given string passes the `allowed`
/// check. an empty string is accepted.
///
/// optionally rejects strings longer than `max_chars` characters.
pub fn check_allowed_chars<G, F>(
    given: G,
    max_chars: Option<usize>,
    allowed: F,
) -> bool
where
    G: AsRef<str>,
    F: Fn(char) -> bool,
{
    let given_ref = given.as_ref();
    let mut char_count = 0;

    if let Some(max_chars) = max_chars {
        for ch in given_ref.chars() {
            if !allowed(ch) {
                return false;
            }

            char_count += 1;

            if char_count > max_chars {
                return false;
            }
        }
    } else {
        for ch in given_ref.chars() {
            if !allowed(ch) {
                return false;
            }
        }
    }

    true
}

/// true if the string is empty or only contains whitespace
pub fn is_blank<G>(given: G) -> bool
where
    G: AsRef<str>
{
    given.as_ref().trim().is_empty()
}

#[cfg(test)]
mod test {
    use super::*;

    fn ascii_word(ch: char) -> bool {
        ch.is_ascii_alphanumeric()
    }

    #[test]
    pub fn check_allowed_chars_empty() {
        assert!(check_allowed_chars("", None, ascii_word), "empty string");
        assert!(check_allowed_chars("", Some(0), ascii_word), "empty string with max");
    }

    #[test]
    pub fn check_allowed_chars_rejected() {
        let leading = String::from("!test");
        let trailing = String::from("test!");
        let contains = String::from("te!st");

        assert!(!check_allowed_chars(leading, None, ascii_word), "leading rejected character");
        assert!(!check_allowed_chars(trailing, None, ascii_word), "trailing rejected character");
        assert!(!check_allowed_chars(contains, None, ascii_word), "contains rejected character");
    }

    #[test]
    pub fn check_allowed_chars_max_length() {
        let k = String::from("abcdefghijklmnopqrstuvwxyzA");
        let count = k.chars().count();
        let max = count - 1;

        assert!(!check_allowed_chars(&k, Some(max), ascii_word), "max {} total {}", max, count);
        assert!(check_allowed_chars(&k, Some(count), ascii_word), "max {} total {}", count, count);
    }

    #[test]
    pub fn blank_strings() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" a "));
    }
}
